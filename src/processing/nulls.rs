//! Sentinel-to-null substitution.

use std::collections::HashSet;

use super::Processor;
use crate::types::{Row, Value};

/// Replaces cell values equal to one of the sentinel strings with the empty value of the
/// cell's type ([`crate::types::CellType::empty_value`]): `""` for String cells, [`Value::Null`] otherwise.
///
/// The cell keeps its type, so later type inference sees the cell as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullProcessor {
    nulls: HashSet<String>,
}

/// Build a [`NullProcessor`] from sentinel literals such as `"null"`, `"n/a"` or `"-"`.
pub fn null_processor<S: Into<String>>(nulls: impl IntoIterator<Item = S>) -> NullProcessor {
    NullProcessor {
        nulls: nulls.into_iter().map(Into::into).collect(),
    }
}

impl Processor for NullProcessor {
    fn process(&self, _index: usize, row: Row) -> Option<Row> {
        Some(
            row.into_iter()
                .map(|mut cell| {
                    if matches!(&cell.value, Value::Text(s) if self.nulls.contains(s.as_str())) {
                        cell.value = cell.cell_type.empty_value();
                    }
                    cell
                })
                .collect(),
        )
    }
}
