//! Row processors applied lazily by a [`crate::rowset::RowSet`].
//!
//! A processor maps `(index, row)` to a new row, or to `None` to drop the row. `index` is
//! the position of the row in the raw stream, before any processor ran. Processors take
//! the row by value: the row set hands each pipeline a fresh copy, so a chain can be
//! replayed for every iteration.
//!
//! Standard processors:
//!
//! - [`headers_processor()`]: names cells by position
//! - [`offset_processor()`]: drops rows before an index
//! - [`types_processor()`]: casts cells to per-column types
//! - [`null_processor()`]: turns sentinel strings into empty values
//!
//! ## Example: guess → strip header → cast
//!
//! ```rust
//! use anytable::inference::{headers_guess, type_guess};
//! use anytable::processing::{headers_processor, offset_processor, types_processor};
//! use anytable::rowset::RowSet;
//! use anytable::types::{Cell, CellType, Value};
//!
//! let rows = vec![
//!     vec![Cell::text("id"), Cell::text("score")],
//!     vec![Cell::text("1"), Cell::text("2.5")],
//!     vec![Cell::text("2"), Cell::text("7")],
//! ];
//! let mut rs = RowSet::from_rows("t", rows, None);
//!
//! let (offset, headers) = headers_guess(rs.sample());
//! rs.register_processor(headers_processor(headers));
//! rs.register_processor(offset_processor(offset + 1));
//! let types = type_guess(rs.sample(), false);
//! assert_eq!(types, vec![CellType::Integer, CellType::Float]);
//!
//! rs.register_processor(types_processor(types));
//! let first = rs.iter().next().unwrap().unwrap();
//! assert_eq!(first[0].value, Value::Integer(1));
//! assert_eq!(first[1].column.as_deref(), Some("score"));
//! ```

pub mod headers;
pub mod nulls;
pub mod offset;
pub mod types;

pub use headers::{headers_processor, HeadersProcessor};
pub use nulls::{null_processor, NullProcessor};
pub use offset::{offset_processor, OffsetProcessor};
pub use types::{types_processor, TypesProcessor};

use crate::types::Row;

/// A pure row transformation.
pub trait Processor {
    /// Transform the row at raw stream position `index`; `None` drops it.
    fn process(&self, index: usize, row: Row) -> Option<Row>;
}

impl<F> Processor for F
where
    F: Fn(usize, Row) -> Option<Row>,
{
    fn process(&self, index: usize, row: Row) -> Option<Row> {
        self(index, row)
    }
}
