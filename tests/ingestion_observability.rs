use std::io::Cursor;
use std::sync::{Arc, Mutex};

use anytable::ingestion::{
    detect_and_open, open_path, CompositeObserver, DetectOptions, FileObserver, Format, IngestionContext,
    IngestionObserver, IngestionSeverity, IngestionStats,
};
use anytable::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(Option<Format>, usize)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.format, stats.tables));
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn observed(obs: &Arc<RecordingObserver>, alert_at_or_above: IngestionSeverity) -> DetectOptions {
    DetectOptions {
        observer: Some(obs.clone()),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_success_with_format_and_table_count() {
    let obs = Arc::new(RecordingObserver::default());
    detect_and_open(Cursor::new(b"a,b\n1,2\n".to_vec()), &observed(&obs, IngestionSeverity::Critical)).unwrap();

    assert_eq!(obs.successes.lock().unwrap().clone(), vec![(Some(Format::Csv), 1)]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());

    // Missing file -> Io error -> Critical
    let _ = open_path("tests/fixtures/does_not_exist.csv", &observed(&obs, IngestionSeverity::Critical)).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn undetectable_content_fails_without_alert_below_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = DetectOptions {
        extension: Some("blob.bin".to_string()),
        auto_detect: false,
        ..observed(&obs, IngestionSeverity::Critical)
    };

    let _ = detect_and_open(Cursor::new(vec![0u8, 1, 2]), &opts).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn alert_threshold_is_inclusive() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = DetectOptions {
        extension: Some("report.pdf".to_string()),
        ..observed(&obs, IngestionSeverity::Error)
    };

    let _ = detect_and_open(Cursor::new(b"%PDF-1.4".to_vec()), &opts).unwrap_err();

    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_and_file_observers_fan_out() {
    let path = std::env::temp_dir().join(format!(
        "anytable-observer-{}.log",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let recording = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![recording.clone(), Arc::new(FileObserver::new(&path))];
    let composite = CompositeObserver::new(observers);
    let opts = DetectOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    detect_and_open(Cursor::new(b"x\ty\n1\t2\n".to_vec()), &opts).unwrap();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    let log = std::fs::read_to_string(&path).unwrap();
    assert!(log.contains("format=CSV"));
    assert!(log.contains("tables=1"));

    let _ = std::fs::remove_file(&path);
}
