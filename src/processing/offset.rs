//! Skip leading rows by stream position.

use super::Processor;
use crate::types::Row;

/// Drops every row whose raw stream index is below `offset`.
///
/// Typically registered with `offset + 1` after header detection so the header row and
/// any banner rows above it disappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetProcessor {
    offset: usize,
}

/// Build an [`OffsetProcessor`].
pub fn offset_processor(offset: usize) -> OffsetProcessor {
    OffsetProcessor { offset }
}

impl Processor for OffsetProcessor {
    fn process(&self, index: usize, row: Row) -> Option<Row> {
        (index >= self.offset).then_some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[test]
    fn drops_rows_before_offset_regardless_of_content() {
        let p = offset_processor(2);
        assert!(p.process(0, vec![Cell::text("1")]).is_none());
        assert!(p.process(1, vec![]).is_none());
        assert_eq!(p.process(2, vec![Cell::text("x")]).unwrap().len(), 1);
    }
}
