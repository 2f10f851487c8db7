#![cfg(feature = "html")]

//! Markup-table decoding through `scraper`.
//!
//! Every `<table>` becomes a row set named `Table i of N`, numbered in closing-tag order:
//! a nested table comes before the table that contains it. An outer table keeps its own
//! cells, whose text includes the text of any nested table.

use std::io::Read;

use scraper::{ElementRef, Html};

use crate::error::IngestionResult;
use crate::rowset::{RowSet, TableSet};
use crate::types::{Cell, Row};

use super::encoding::{decode_text, detect_encoding};
use super::stream::read_remaining;

/// Property holding the markup tag (`td` or `th`) of a decoded cell.
pub const TAG_PROPERTY: &str = "tag";

/// Decode all tables of a document read from the current position of `stream`.
pub fn html_table_set<R: Read>(mut stream: R, window: Option<usize>) -> IngestionResult<TableSet> {
    let bytes = read_remaining(&mut stream)?;
    let encoding = detect_encoding(&bytes, None)?;
    let document = Html::parse_document(&decode_text(&bytes, encoding));

    let mut tables = Vec::new();
    collect_tables(document.root_element(), &mut tables);
    tracing::debug!(tables = tables.len(), encoding = encoding.name(), "parsed markup");

    let count = tables.len();
    let row_sets = tables
        .into_iter()
        .enumerate()
        .map(|(i, table)| RowSet::from_rows(format!("Table {} of {}", i + 1, count), table_rows(table), window))
        .collect();
    Ok(TableSet::new(row_sets))
}

fn is(element: &ElementRef<'_>, name: &str) -> bool {
    element.value().name().eq_ignore_ascii_case(name)
}

fn collect_tables<'a>(element: ElementRef<'a>, out: &mut Vec<ElementRef<'a>>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        collect_tables(child, out);
    }
    if is(&element, "table") {
        out.push(element);
    }
}

// Header rows first and footer rows last, like a rendered table.
fn section_rank(tr: &ElementRef<'_>) -> u8 {
    match tr.parent().and_then(ElementRef::wrap) {
        Some(p) if is(&p, "thead") => 0,
        Some(p) if is(&p, "tfoot") => 2,
        _ => 1,
    }
}

fn table_rows(table: ElementRef<'_>) -> Vec<Row> {
    let mut trs: Vec<ElementRef<'_>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| is(e, "tr"))
        .filter(|tr| {
            tr.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| is(a, "table"))
                .is_some_and(|owner| owner.id() == table.id())
        })
        .collect();
    trs.sort_by_key(section_rank);

    let mut spans = SpanTracker::default();
    trs.into_iter()
        .map(|tr| {
            let cells = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| is(e, "td") || is(e, "th"));
            spans.layout(cells)
        })
        .collect()
}

/// Largest honoured `colspan`, as in browsers.
pub const MAX_COLSPAN: usize = 1000;
/// Largest honoured `rowspan`, as in browsers.
pub const MAX_ROWSPAN: usize = 65534;

fn span_attr(cell: &ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .map(|v| v.parse::<usize>().unwrap_or(usize::MAX))
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(max))
}

/// Expands `colspan`/`rowspan` into blank placeholder cells.
#[derive(Default)]
struct SpanTracker {
    // (column, rows still covered below the current row)
    pending: Vec<(usize, usize)>,
}

impl SpanTracker {
    fn covered(&self, column: usize) -> bool {
        self.pending.iter().any(|&(c, left)| c == column && left > 0)
    }

    fn layout<'a>(&mut self, cells: impl Iterator<Item = ElementRef<'a>>) -> Row {
        let mut row = Row::new();
        let mut fresh = Vec::new();
        let mut cells = cells.peekable();

        while cells.peek().is_some() || self.covered(row.len()) {
            if self.covered(row.len()) {
                row.push(Cell::text(""));
                continue;
            }
            let Some(cell) = cells.next() else { break };
            let column = row.len();
            let colspan = span_attr(&cell, "colspan", MAX_COLSPAN);
            let rowspan = span_attr(&cell, "rowspan", MAX_ROWSPAN);

            let text: String = cell.text().collect();
            row.push(Cell::text(text).with_property(TAG_PROPERTY, cell.value().name()));
            row.extend((1..colspan).map(|_| Cell::text("")));
            if rowspan > 1 {
                fresh.extend((column..column + colspan).map(|c| (c, rowspan - 1)));
            }
        }

        for (_, left) in &mut self.pending {
            *left = left.saturating_sub(1);
        }
        self.pending.retain(|&(_, left)| left > 0);
        self.pending.extend(fresh);
        row
    }
}
