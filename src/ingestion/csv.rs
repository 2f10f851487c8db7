//! Delimited-text (CSV/TSV) decoding.
//!
//! The only decoder that streams: the row set keeps its sample and re-reads the shared
//! stream from the recorded start position for every full iteration.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::IngestionResult;
use crate::rowset::{RawRows, RowSet, RowSource, TableSet};
use crate::types::{Cell, Row};

use super::dialect::{self, Dialect, DialectOverrides, InitialSpaceSkipper};
use super::encoding::{decode_text, detect_encoding, TranscodingReader, SNIFF_BYTES};
use super::stream::{peek, share, SharedReader, SharedStream};

/// Name given to a delimited-text table when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "table";

/// Options for delimited-text decoding.
///
/// Use [`Default`] for sniffing everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Table name; defaults to [`DEFAULT_TABLE_NAME`].
    pub name: Option<String>,
    /// Encoding label (e.g. `"utf-16le"`, `"latin1"`); detected when `None`.
    pub encoding: Option<String>,
    /// Dialect fields that replace sniffed values.
    pub dialect: DialectOverrides,
    /// Sample window; [`crate::rowset::DEFAULT_WINDOW`] when `None`.
    pub window: Option<usize>,
}

/// Re-reads the shared stream from `start` on every [`RowSource::open`].
struct CsvSource {
    stream: SharedStream,
    start: u64,
    encoding: &'static Encoding,
    dialect: Dialect,
}

impl RowSource for CsvSource {
    fn open(&self) -> IngestionResult<RawRows<'_>> {
        let reader = SharedReader::at(self.stream.clone(), self.start)?;
        let text = TranscodingReader::new(reader, self.encoding);
        let input: Box<dyn Read> = if self.dialect.skip_initial_space {
            Box::new(InitialSpaceSkipper::new(text, &self.dialect))
        } else {
            Box::new(text)
        };
        let records = self.dialect.reader_builder().from_reader(input).into_records();
        Ok(Box::new(records.map(|record| -> IngestionResult<Row> {
            Ok(record?.iter().map(|field| Cell::text(field)).collect())
        })))
    }
}

/// Decode `stream` from its current position as one delimited-text table.
pub fn csv_row_set(stream: impl Read + Seek + 'static, options: &CsvOptions) -> IngestionResult<RowSet> {
    let mut stream = stream;
    let start = stream.stream_position()?;
    let prefix = peek(&mut stream, SNIFF_BYTES)?;

    let encoding = detect_encoding(&prefix, options.encoding.as_deref())?;
    let dialect = dialect::sniff(&decode_text(&prefix, encoding)).with_overrides(&options.dialect);
    tracing::debug!(
        encoding = encoding.name(),
        delimiter = %char::from(dialect.delimiter).escape_default(),
        quote = %char::from(dialect.quote),
        "sniffed delimited text"
    );

    let name = options.name.clone().unwrap_or_else(|| DEFAULT_TABLE_NAME.to_owned());
    let source = CsvSource {
        stream: share(stream),
        start,
        encoding,
        dialect,
    };
    RowSet::new(name, source, options.window)
}

/// Decode `stream` as a [`TableSet`] holding a single delimited-text table.
pub fn csv_table_set(stream: impl Read + Seek + 'static, options: &CsvOptions) -> IngestionResult<TableSet> {
    Ok(TableSet::new(vec![csv_row_set(stream, options)?]))
}

/// Like [`csv_table_set`] with the delimiter fixed to tab unless overridden.
pub fn tab_table_set(stream: impl Read + Seek + 'static, options: &CsvOptions) -> IngestionResult<TableSet> {
    let mut options = options.clone();
    options.dialect.delimiter.get_or_insert(b'\t');
    csv_table_set(stream, &options)
}

/// Open a file and decode it with [`csv_table_set`].
pub fn csv_table_set_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> IngestionResult<TableSet> {
    csv_table_set(File::open(path)?, options)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::types::Value;

    fn cursor(s: &str) -> Cursor<Vec<u8>> {
        Cursor::new(s.as_bytes().to_vec())
    }

    fn values(rs: &RowSet) -> Vec<Vec<String>> {
        rs.iter()
            .map(|r| r.unwrap().iter().map(|c| c.value.to_string()).collect())
            .collect()
    }

    #[test]
    fn default_name_and_ragged_rows() {
        let rs = csv_row_set(cursor("a,b,c\n1,2\n3,4,5,6\n"), &CsvOptions::default()).unwrap();
        assert_eq!(rs.name(), DEFAULT_TABLE_NAME);
        let widths: Vec<usize> = rs.iter().map(|r| r.unwrap().len()).collect();
        assert_eq!(widths, vec![3, 2, 4]);
    }

    #[test]
    fn starts_at_the_stream_position() {
        let mut c = cursor("junk\na,b\n1,2\n");
        c.set_position(5);
        let rs = csv_row_set(c, &CsvOptions::default()).unwrap();
        assert_eq!(values(&rs), vec![vec!["a", "b"], vec!["1", "2"]]);
        assert_eq!(values(&rs), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn tab_default_and_override() {
        let ts = tab_table_set(cursor("a\tb;c\n"), &CsvOptions::default()).unwrap();
        assert_eq!(ts.tables()[0].sample().next().unwrap().len(), 2);

        let options = CsvOptions {
            dialect: DialectOverrides {
                delimiter: Some(b';'),
                ..Default::default()
            },
            ..Default::default()
        };
        let ts = tab_table_set(cursor("a\tb;c\n"), &options).unwrap();
        assert_eq!(ts.tables()[0].sample().next().unwrap()[0].value, Value::Text("a\tb".into()));
    }

    #[test]
    fn skip_initial_space_trims_field_starts() {
        let options = CsvOptions {
            dialect: DialectOverrides {
                skip_initial_space: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let rs = csv_row_set(cursor("a,  b\n"), &options).unwrap();
        assert_eq!(values(&rs), vec![vec!["a", "b"]]);

        let rs = csv_row_set(cursor("a, \"  b, c\"\n"), &options).unwrap();
        assert_eq!(values(&rs), vec![vec!["a", "  b, c"]]);
    }

    #[test]
    fn explicit_encoding_label() {
        let options = CsvOptions {
            encoding: Some("latin1".into()),
            ..Default::default()
        };
        let rs = csv_row_set(Cursor::new(b"caf\xe9,1\n".to_vec()), &options).unwrap();
        assert_eq!(values(&rs), vec![vec!["caf\u{e9}", "1"]]);
    }
}
