#![cfg(feature = "excel_test_writer")]

use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anytable::inference::{headers_guess, type_guess};
use anytable::ingestion::{detect_and_open, detect_format, open_path, DetectOptions, DetectionStage, Format};
use anytable::processing::offset_processor;
use anytable::types::{CellType, Value};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("anytable-{name}-{nanos}.xlsx"))
}

fn write_people_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::{ExcelDateTime, Format as CellFormat, Workbook};

    let mut wb = Workbook::new();
    let date_format = CellFormat::new().set_num_format("yyyy-mm-dd");

    let ws1 = wb.add_worksheet();
    ws1.set_name("People").unwrap();
    ws1.write_string(0, 0, "name").unwrap();
    ws1.write_string(0, 1, "score").unwrap();
    ws1.write_string(0, 2, "active").unwrap();
    ws1.write_string(0, 3, "joined").unwrap();
    ws1.write_string(1, 0, "Ada").unwrap();
    ws1.write_number(1, 1, 98.5).unwrap();
    ws1.write_boolean(1, 2, true).unwrap();
    let joined = ExcelDateTime::from_ymd(2011, 1, 1).unwrap();
    ws1.write_datetime_with_format(1, 3, &joined, &date_format).unwrap();
    ws1.write_string(2, 0, "Grace").unwrap();
    ws1.write_number(2, 1, 87.25).unwrap();
    ws1.write_boolean(2, 2, false).unwrap();
    let joined = ExcelDateTime::from_ymd(2012, 6, 30).unwrap();
    ws1.write_datetime_with_format(2, 3, &joined, &date_format).unwrap();

    // Used range starts at B3.
    let ws2 = wb.add_worksheet();
    ws2.set_name("Offset").unwrap();
    ws2.write_string(2, 1, "x").unwrap();
    ws2.write_number(3, 1, 1).unwrap();

    wb.save(path).unwrap();
}

#[test]
fn every_sheet_becomes_a_table_with_native_types() {
    let path = tmp_file("people");
    write_people_xlsx(&path);

    let mut ts = open_path(&path, &DetectOptions::default()).unwrap();
    assert_eq!(ts.names().collect::<Vec<_>>(), vec!["People", "Offset"]);

    let people = ts.by_name_mut("People").unwrap();
    let (offset, headers) = headers_guess(people.sample());
    assert_eq!(offset, 0);
    assert_eq!(headers, vec!["name", "score", "active", "joined"]);

    people.register_processor(offset_processor(offset + 1));
    let types = type_guess(people.sample(), false);
    assert_eq!(
        types,
        vec![CellType::String, CellType::Float, CellType::Bool, CellType::Date(None)]
    );

    let first = people.iter().next().unwrap().unwrap();
    assert_eq!(first[1].value, Value::Float(98.5));
    assert_eq!(first[2].value, Value::Bool(true));
    assert_eq!(first[3].value.to_string(), "2011-01-01");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn rows_keep_their_sheet_coordinates() {
    let path = tmp_file("offset");
    write_people_xlsx(&path);

    let ts = open_path(&path, &DetectOptions::default()).unwrap();
    let rows: Vec<_> = ts.by_name("Offset").unwrap().sample().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].is_empty() && rows[1].is_empty());
    assert!(rows[2][0].empty());
    assert_eq!(rows[2][1].value.to_string(), "x");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_is_detected_without_a_name() {
    let path = tmp_file("sniffed");
    write_people_xlsx(&path);
    let bytes = std::fs::read(&path).unwrap();

    let d = detect_format(&mut Cursor::new(bytes.clone()), &DetectOptions::default()).unwrap();
    assert_eq!((d.format, d.stage), (Format::Xls, DetectionStage::ContentSniff));
    let ts = detect_and_open(Cursor::new(bytes), &DetectOptions::default()).unwrap();
    assert_eq!(ts.len(), 2);

    let _ = std::fs::remove_file(&path);
}
