//! Positional column naming.

use super::Processor;
use crate::types::Row;

/// Assigns `column` on each cell from a header list; values and types are untouched.
///
/// Cells past the end of the header list keep `column = None`. Short rows are not padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersProcessor {
    headers: Vec<String>,
}

/// Build a [`HeadersProcessor`].
pub fn headers_processor<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> HeadersProcessor {
    HeadersProcessor {
        headers: headers.into_iter().map(Into::into).collect(),
    }
}

impl Processor for HeadersProcessor {
    fn process(&self, _index: usize, row: Row) -> Option<Row> {
        Some(
            row.into_iter()
                .enumerate()
                .map(|(i, cell)| cell.with_column(self.headers.get(i).cloned()))
                .collect(),
        )
    }
}
