use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anytable::ingestion::{
    clean_ext, detect_and_open, detect_format, open_path, DetectOptions, DetectionStage, Format,
};
use anytable::schema::rowset_as_schema;
use anytable::ErrorKind;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("anytable-{nanos}-{name}"))
}

fn bytes(s: &str) -> Cursor<Vec<u8>> {
    Cursor::new(s.as_bytes().to_vec())
}

#[test]
fn mime_hint_short_circuits_without_diagnostics() {
    let opts = DetectOptions {
        mime_type: Some("text/csv".to_string()),
        extension: Some("misleading.xlsx".to_string()),
        ..Default::default()
    };
    let d = detect_format(&mut bytes("a,b\n1,2\n"), &opts).unwrap();
    assert_eq!(d.format, Format::Csv);
    assert_eq!(d.stage, DetectionStage::MimeHint);
    assert!(d.diagnostics.is_empty());
}

#[test]
fn unknown_extension_without_sniffing_fails_with_diagnostics() {
    let opts = DetectOptions {
        extension: Some("notes.docx".to_string()),
        auto_detect: false,
        ..Default::default()
    };
    let err = detect_and_open(bytes("a,b\n1,2\n"), &opts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Read);
    assert_eq!(err.diagnostics().len(), 1);
    assert!(err.diagnostics()[0].contains("docx"));
    assert!(err.diagnostics()[0].contains("notes.docx"));
}

#[test]
fn every_rejected_stage_is_reported() {
    let opts = DetectOptions {
        mime_type: Some("image/png".to_string()),
        extension: Some("blob.bin".to_string()),
        ..Default::default()
    };
    let err = detect_and_open(Cursor::new(Vec::new()), &opts).unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics[0].contains("image/png"));
    assert!(diagnostics[1].contains("bin"));
    assert!(diagnostics[2].contains("application/x-empty"));
}

#[test]
fn unknown_extension_falls_through_to_content_sniffing() {
    let opts = DetectOptions {
        extension: Some("export.dat".to_string()),
        ..Default::default()
    };
    let d = detect_format(&mut bytes("x;y\n1;2\n"), &opts).unwrap();
    assert_eq!(d.format, Format::Csv);
    assert_eq!(d.stage, DetectionStage::ContentSniff);
    assert_eq!(d.diagnostics.len(), 1);

    let ts = detect_and_open(bytes("x;y\n1;2\n"), &opts).unwrap();
    let first = ts.tables()[0].sample().next().unwrap();
    assert_eq!(first.len(), 2);
}

#[test]
fn clean_ext_handles_urls_and_bare_extensions() {
    assert_eq!(clean_ext("http://myserver.info/file.xlsx?download=True"), "xlsx");
    assert_eq!(clean_ext("tsv"), "tsv");
    assert_eq!(clean_ext("FILE.ZIP"), "zip");
    assert_eq!(clean_ext(""), "");
}

#[test]
fn open_path_uses_the_file_name_as_hint() {
    let path = tmp_file("tabbed.tsv");
    std::fs::write(&path, "id\tname\n1\tAda\n").unwrap();

    let ts = open_path(&path, &DetectOptions::default()).unwrap();
    let rows: Vec<Vec<String>> = ts.tables()[0]
        .iter()
        .map(|r| r.unwrap().iter().map(|c| c.value.to_string()).collect())
        .collect();
    assert_eq!(rows, vec![vec!["id", "name"], vec!["1", "Ada"]]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn open_path_reports_missing_files_as_io_errors() {
    let err = open_path("tests/fixtures/does_not_exist.csv", &DetectOptions::default()).unwrap_err();
    assert!(matches!(err, anytable::IngestionError::Io(_)));
}

#[test]
fn window_applies_to_every_decoded_table() {
    let mut data = String::from("n\n");
    for i in 0..50 {
        data.push_str(&format!("{i}\n"));
    }
    let opts = DetectOptions {
        window: Some(5),
        ..Default::default()
    };
    let ts = detect_and_open(Cursor::new(data.into_bytes()), &opts).unwrap();
    assert_eq!(ts.tables()[0].window(), 5);
    assert_eq!(ts.tables()[0].sample().count(), 5);
    assert_eq!(ts.tables()[0].iter().count(), 51);
}

#[test]
fn schema_export_of_a_sniffed_csv() {
    let ts = detect_and_open(bytes("name,dob\nmk,2012-01-02\n"), &DetectOptions::default()).unwrap();
    let schema = rowset_as_schema(&ts.tables()[0]);
    let types: Vec<&str> = schema.fields.iter().map(|f| f.field_type.as_str()).collect();
    assert_eq!(types, vec!["string", "date"]);
    assert_eq!(schema.fields[1].label, "dob");
}
