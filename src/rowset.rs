//! Restartable row streams ([`RowSet`]) and named collections of them ([`TableSet`]).
//!
//! A single forward-only iterator cannot serve both "peek at the first rows" and "iterate
//! everything". A [`RowSet`] therefore keeps the leading `window` rows as a permanent
//! sample and asks its [`RowSource`] to decode again from row zero for every full
//! iteration.

use std::fmt;

use crate::error::{IngestionError, IngestionResult};
use crate::processing::Processor;
use crate::types::Row;

/// Number of leading rows kept as sample when no window is configured.
pub const DEFAULT_WINDOW: usize = 1000;

/// Fallible row stream produced by a [`RowSource`].
pub type RawRows<'a> = Box<dyn Iterator<Item = IngestionResult<Row>> + 'a>;

/// Something that can decode a table from its first row, any number of times.
///
/// Every call to [`RowSource::open`] must start over and reproduce the same sequence.
pub trait RowSource {
    /// Start decoding from row zero.
    fn open(&self) -> IngestionResult<RawRows<'_>>;
}

/// A source over rows that are already decoded and held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl RowSource for MemorySource {
    fn open(&self) -> IngestionResult<RawRows<'_>> {
        Ok(Box::new(self.rows.iter().cloned().map(Ok)))
    }
}

/// A named, lazily decoded, restartable table.
///
/// Not safe to iterate from two places at once: sources backed by a shared stream
/// reposition that stream when a new iteration starts.
pub struct RowSet {
    name: String,
    window: usize,
    sample: Vec<Row>,
    source: Box<dyn RowSource>,
    processors: Vec<Box<dyn Processor>>,
}

impl fmt::Debug for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSet")
            .field("name", &self.name)
            .field("window", &self.window)
            .field("sample_len", &self.sample.len())
            .field("processors_len", &self.processors.len())
            .finish()
    }
}

impl RowSet {
    /// Wrap `source`, eagerly decoding only the first `window` rows.
    pub fn new(
        name: impl Into<String>,
        source: impl RowSource + 'static,
        window: Option<usize>,
    ) -> IngestionResult<Self> {
        let window = window.unwrap_or(DEFAULT_WINDOW);
        let sample = source
            .open()?
            .take(window)
            .collect::<IngestionResult<Vec<Row>>>()?;
        Ok(Self {
            name: name.into(),
            window,
            sample,
            source: Box::new(source),
            processors: Vec::new(),
        })
    }

    /// Build a row set over rows that are already in memory.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Row>, window: Option<usize>) -> Self {
        let window = window.unwrap_or(DEFAULT_WINDOW);
        let sample = rows.iter().take(window).cloned().collect();
        Self {
            name: name.into(),
            window,
            sample,
            source: Box::new(MemorySource::new(rows)),
            processors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of rows kept in the sample.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Append a processor; processors run in registration order on every produced row.
    pub fn register_processor(&mut self, processor: impl Processor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Number of registered processors.
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// The sampled rows with all processors applied. Can be called any number of times.
    pub fn sample(&self) -> impl Iterator<Item = Row> + '_ {
        self.sample
            .iter()
            .cloned()
            .enumerate()
            .filter_map(|(index, row)| self.apply(index, row))
    }

    /// Rows without any processors applied.
    ///
    /// With `sample_only`, yields the stored sample; otherwise decodes the whole source again.
    pub fn raw(&self, sample_only: bool) -> IngestionResult<RawRows<'_>> {
        if sample_only {
            return Ok(Box::new(self.sample.iter().cloned().map(Ok)));
        }
        self.source.open()
    }

    /// Full iteration: re-decodes the source from the start with processors applied.
    pub fn iter(&self) -> Rows<'_> {
        match self.source.open() {
            Ok(inner) => Rows {
                rowset: self,
                inner: Some(inner),
                pending: None,
                index: 0,
            },
            Err(e) => Rows {
                rowset: self,
                inner: None,
                pending: Some(e),
                index: 0,
            },
        }
    }

    fn apply(&self, index: usize, row: Row) -> Option<Row> {
        self.processors
            .iter()
            .try_fold(row, |row, processor| processor.process(index, row))
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = IngestionResult<Row>;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`RowSet::iter`].
pub struct Rows<'a> {
    rowset: &'a RowSet,
    inner: Option<RawRows<'a>>,
    pending: Option<IngestionError>,
    index: usize,
}

impl Iterator for Rows<'_> {
    type Item = IngestionResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending.take() {
            return Some(Err(e));
        }
        let inner = self.inner.as_mut()?;
        loop {
            let row = match inner.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };
            let index = self.index;
            self.index += 1;
            if let Some(row) = self.rowset.apply(index, row) {
                return Some(Ok(row));
            }
        }
    }
}

/// The tables decoded from one container.
///
/// Membership is fixed at construction; each table's processor chain stays mutable.
#[derive(Debug, Default)]
pub struct TableSet {
    tables: Vec<RowSet>,
}

impl TableSet {
    pub fn new(tables: Vec<RowSet>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[RowSet] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [RowSet] {
        &mut self.tables
    }

    pub fn into_tables(self) -> Vec<RowSet> {
        self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names in order (duplicates included).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(RowSet::name)
    }

    /// Look a table up by name.
    ///
    /// Fails with [`IngestionError::TableNotFound`] when absent and
    /// [`IngestionError::AmbiguousTable`] when several tables share the name.
    pub fn by_name(&self, name: &str) -> IngestionResult<&RowSet> {
        let index = self.position(name)?;
        Ok(&self.tables[index])
    }

    /// Mutable variant of [`TableSet::by_name`], e.g. to register processors.
    pub fn by_name_mut(&mut self, name: &str) -> IngestionResult<&mut RowSet> {
        let index = self.position(name)?;
        Ok(&mut self.tables[index])
    }

    fn position(&self, name: &str) -> IngestionResult<usize> {
        let matches: Vec<usize> = self
            .tables
            .iter()
            .enumerate()
            .filter(|(_, t)| t.name == name)
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [] => Err(IngestionError::TableNotFound { name: name.to_owned() }),
            [only] => Ok(*only),
            _ => Err(IngestionError::AmbiguousTable {
                name: name.to_owned(),
                count: matches.len(),
            }),
        }
    }
}

impl IntoIterator for TableSet {
    type Item = RowSet;
    type IntoIter = std::vec::IntoIter<RowSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    use super::*;
    use crate::error::ErrorKind;
    use crate::types::Cell;

    fn row(values: &[&str]) -> Row {
        values.iter().map(|v| Cell::text(*v)).collect()
    }

    struct CountingSource {
        rows: Vec<Row>,
        opened: Rc<Counter<usize>>,
    }

    impl RowSource for CountingSource {
        fn open(&self) -> IngestionResult<RawRows<'_>> {
            self.opened.set(self.opened.get() + 1);
            Ok(Box::new(self.rows.iter().cloned().map(Ok)))
        }
    }

    #[test]
    fn sample_is_bounded_by_window_and_restartable() {
        let rows: Vec<Row> = (0..10).map(|i| row(&[&i.to_string()])).collect();
        let rs = RowSet::from_rows("t", rows, Some(3));

        let first: Vec<Row> = rs.sample().collect();
        let second: Vec<Row> = rs.sample().collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(rs.iter().count(), 10);
    }

    #[test]
    fn full_iteration_reopens_source_each_time() {
        let opened = Rc::new(Counter::new(0));
        let source = CountingSource {
            rows: vec![row(&["a"]), row(&["b"])],
            opened: opened.clone(),
        };
        let rs = RowSet::new("t", source, None).unwrap();
        assert_eq!(opened.get(), 1);

        let a: Vec<Row> = rs.iter().collect::<IngestionResult<_>>().unwrap();
        let b: Vec<Row> = rs.iter().collect::<IngestionResult<_>>().unwrap();
        assert_eq!(opened.get(), 3);
        assert_eq!(a, b);
        assert_eq!(a, rs.sample().collect::<Vec<_>>());
    }

    #[test]
    fn processors_run_in_order_with_stream_index() {
        let mut rs = RowSet::from_rows("t", vec![row(&["a"]), row(&["b"]), row(&["c"])], None);
        rs.register_processor(|index: usize, row: Row| (index != 1).then_some(row));
        rs.register_processor(|_: usize, mut row: Row| {
            row.push(Cell::text("x"));
            Some(row)
        });

        let out: Vec<Row> = rs.iter().map(Result::unwrap).collect();
        assert_eq!(out, vec![row(&["a", "x"]), row(&["c", "x"])]);
        assert_eq!(rs.sample().collect::<Vec<_>>(), out);
        assert_eq!(rs.raw(true).unwrap().count(), 3);
    }

    #[test]
    fn lookup_by_name_distinguishes_missing_and_duplicate() {
        let ts = TableSet::new(vec![
            RowSet::from_rows("a", vec![], None),
            RowSet::from_rows("b", vec![], None),
            RowSet::from_rows("b", vec![], None),
        ]);
        assert_eq!(ts.by_name("a").unwrap().name(), "a");
        assert!(matches!(ts.by_name("zzz"), Err(IngestionError::TableNotFound { .. })));
        let dup = ts.by_name("b").unwrap_err();
        assert!(matches!(dup, IngestionError::AmbiguousTable { count: 2, .. }));
        assert_eq!(dup.kind(), ErrorKind::Table);
        assert_eq!(ts.names().collect::<Vec<_>>(), vec!["a", "b", "b"]);
    }
}
