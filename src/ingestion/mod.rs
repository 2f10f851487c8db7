//! Format detection and decoders.
//!
//! Most callers should use [`detect_and_open`] or [`open_path`] (from [`unified`]) which:
//!
//! - pick a format from a MIME hint, a file extension or the content itself
//! - decode the source into a [`crate::rowset::TableSet`]
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific decoders are also available under:
//! - [`csv`] (with [`dialect`] sniffing and [`encoding`] detection)
//! - `excel` (feature `excel`)
//! - `html` (feature `html`)
//! - [`zip`]

pub mod csv;
pub mod dialect;
pub mod encoding;
#[cfg(feature = "excel")]
pub mod excel;
pub mod format;
#[cfg(feature = "html")]
pub mod html;
pub mod observability;
pub mod sniff;
pub mod stream;
pub mod unified;
pub mod zip;

pub use self::csv::{csv_row_set, csv_table_set, csv_table_set_from_path, tab_table_set, CsvOptions};
pub use dialect::{Dialect, DialectOverrides, LineTerminator};
pub use format::{clean_ext, Format};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver, TracingObserver,
};
pub use stream::buffer_stream;
pub use unified::{
    detect_and_open, detect_format, open_format, open_path, severity_for_error, DetectOptions, Detection,
    DetectionStage,
};
