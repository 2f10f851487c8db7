//! `anytable` reads tables out of files of unknown, possibly messy origin and exposes them
//! as restartable streams of typed cells, whatever the source format.
//!
//! The primary entrypoints are [`ingestion::detect_and_open`] and [`ingestion::open_path`],
//! which pick a decoder from a MIME hint, a file extension or the content itself (see
//! [`ingestion::DetectOptions`]).
//!
//! ## What you can read
//!
//! - **Delimited text**: `.csv`, `.tsv`; dialect and encoding are sniffed
//! - **Spreadsheets** (Cargo feature `excel`, on by default): `.xls`, `.xlsx`, `.xlsm`, `.ods`, ...
//! - **Markup tables** (Cargo feature `html`, on by default): `.htm`, `.html`
//! - **ZIP archives** of any of the above
//!
//! PDF is recognised but not decoded.
//!
//! ## Rows, samples and processors
//!
//! Every table is a [`rowset::RowSet`]. It keeps the first rows as a sample for
//! inspection, and decodes the source again from the start whenever it is fully
//! iterated. Processors registered on a row set run lazily on every row produced.
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use anytable::inference::{headers_guess, type_guess};
//! use anytable::ingestion::{detect_and_open, DetectOptions};
//! use anytable::processing::{headers_processor, offset_processor, types_processor};
//! use anytable::types::{CellType, Value};
//!
//! # fn main() -> Result<(), anytable::IngestionError> {
//! let csv = b"date,temperature\n2011-01-01,3\n2011-01-02,-1\n".to_vec();
//! let mut tables = detect_and_open(Cursor::new(csv), &DetectOptions::default())?;
//! let rows = &mut tables.tables_mut()[0];
//!
//! let (offset, headers) = headers_guess(rows.sample());
//! assert_eq!((offset, headers.clone()), (0, vec!["date".to_string(), "temperature".to_string()]));
//! rows.register_processor(headers_processor(headers));
//! rows.register_processor(offset_processor(offset + 1));
//!
//! let types = type_guess(rows.sample(), false);
//! assert_eq!(types, vec![CellType::Date(Some("%Y-%m-%d".into())), CellType::Integer]);
//! rows.register_processor(types_processor(types));
//!
//! let temperatures: Vec<Value> = rows
//!     .iter()
//!     .map(|row| row.map(|r| r[1].value.clone()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(temperatures, vec![Value::Integer(3), Value::Integer(-1)]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format detection, decoders and observers
//! - [`rowset`]: [`rowset::RowSet`] and [`rowset::TableSet`]
//! - [`processing`]: row processors
//! - [`inference`]: header and column type guessing
//! - [`types`]: cells, values and cell types
//! - [`dates`]: the date format catalogue
//! - [`schema`]: table-schema export
//! - [`error`]: error types

pub mod dates;
pub mod error;
pub mod inference;
pub mod ingestion;
pub mod processing;
pub mod rowset;
pub mod schema;
pub mod types;

pub use error::{ErrorKind, IngestionError, IngestionResult};
pub use rowset::{RowSet, TableSet};
pub use types::{Cell, CellType, Row, Value};
