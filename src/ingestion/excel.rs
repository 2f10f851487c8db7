#![cfg(feature = "excel")]

//! Spreadsheet decoding (`.xls`, `.xlsx`, `.xlsm`, `.ods`, ...) through `calamine`.
//!
//! Every worksheet becomes one row set named after the sheet. Sheets are decoded in full
//! when the table set is built; cells keep the workbook's native typing.

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::IngestionResult;
use crate::rowset::{RowSet, TableSet};
use crate::types::{Cell, CellType, Row, Value};

use super::stream::read_remaining;

/// Decode every sheet of a workbook read from the current position of `stream`.
pub fn workbook_table_set<R: Read>(mut stream: R, window: Option<usize>) -> IngestionResult<TableSet> {
    let bytes = read_remaining(&mut stream)?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheets: Vec<String> = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        tracing::debug!(sheet = %sheet, rows = range.height(), "decoded worksheet");
        tables.push(RowSet::from_rows(sheet, sheet_rows(&range), window));
    }
    Ok(TableSet::new(tables))
}

// Rows are placed at their sheet coordinates: a used range starting at C3 yields two
// leading blank rows and two blank cells at the start of every row.
fn sheet_rows(range: &Range<Data>) -> Vec<Row> {
    let Some((top, left)) = range.start() else {
        return Vec::new();
    };
    let blank = || Cell::text("");

    let mut rows: Vec<Row> = (0..top).map(|_| Vec::new()).collect();
    rows.extend(range.rows().map(|cells| {
        (0..left)
            .map(|_| blank())
            .chain(cells.iter().map(convert_cell))
            .collect()
    }));
    rows
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::text(""),
        Data::String(s) => Cell::text(s.as_str()),
        Data::Int(i) => Cell::new(Value::Integer(*i), CellType::Integer),
        Data::Float(f) => Cell::new(Value::Float(*f), CellType::Float),
        Data::Bool(b) => Cell::new(Value::Bool(*b), CellType::Bool),
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64()) {
            Some(when) => Cell::new(Value::Date(when), CellType::Date(None)),
            None => Cell::new(Value::Float(dt.as_f64()), CellType::Float),
        },
        Data::DateTimeIso(s) => match parse_iso(s) {
            Some(when) => Cell::new(Value::Date(when), CellType::Date(None)),
            None => Cell::text(s.as_str()),
        },
        Data::DurationIso(s) => Cell::text(s.as_str()),
        Data::Error(e) => Cell::text(e.to_string()),
    }
}

/// Spreadsheet day serial (1900 date system, day 0 = 1899-12-30) to a timestamp.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
