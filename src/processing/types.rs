//! Cast cells to per-column types.

use super::Processor;
use crate::types::{CellType, Row};

/// Recasts each cell to the type at its column position.
///
/// Values that do not parse become the type's empty value; nothing is raised. Cells past
/// the end of the type list are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesProcessor {
    types: Vec<CellType>,
}

/// Build a [`TypesProcessor`].
pub fn types_processor(types: Vec<CellType>) -> TypesProcessor {
    TypesProcessor { types }
}

impl Processor for TypesProcessor {
    fn process(&self, _index: usize, row: Row) -> Option<Row> {
        Some(
            row.into_iter()
                .enumerate()
                .map(|(i, mut cell)| {
                    if let Some(cell_type) = self.types.get(i) {
                        cell.value = cell_type.cast(&cell.value);
                        cell.cell_type = cell_type.clone();
                    }
                    cell
                })
                .collect(),
        )
    }
}
