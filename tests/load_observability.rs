use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use table_viewer::ingestion::{
    load_from_path, CompositeObserver, FileObserver, FileFormat, LoadContext, LoadObserver, LoadOptions,
    LoadSeverity, LoadStats,
};
use table_viewer::LoadError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(FileFormat, LoadStats)>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push((ctx.format, stats));
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("table-viewer-observability-{nanos}.{ext}"))
}

fn options(obs: &Arc<RecordingObserver>, threshold: LoadSeverity) -> LoadOptions {
    LoadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: threshold,
    }
}

#[test]
fn success_reports_shape() {
    let obs = Arc::new(RecordingObserver::default());
    load_from_path("tests/fixtures/people.csv", &options(&obs, LoadSeverity::Critical)).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes, vec![(FileFormat::Csv, LoadStats { rows: 2, columns: 2 })]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn missing_file_is_critical_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let _ = load_from_path("tests/fixtures/does_not_exist.csv", &options(&obs, LoadSeverity::Critical))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
}

#[test]
fn parse_failure_is_error_without_alert_at_critical_threshold() {
    let path = tmp_file("csv");
    std::fs::write(&path, "a\n1,2\n").unwrap();
    let obs = Arc::new(RecordingObserver::default());
    let _ = load_from_path(&path, &options(&obs, LoadSeverity::Critical)).unwrap_err();
    let _ = std::fs::remove_file(&path);

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn unsupported_and_empty_are_warnings() {
    let path = tmp_file("xpt");
    std::fs::write(&path, b"").unwrap();
    let obs = Arc::new(RecordingObserver::default());
    let opts = options(&obs, LoadSeverity::Warning);

    let _ = load_from_path("notes.txt", &opts).unwrap_err();
    let _ = load_from_path(&path, &opts).unwrap_err();
    let _ = std::fs::remove_file(&path);

    assert_eq!(
        *obs.failures.lock().unwrap(),
        vec![LoadSeverity::Warning, LoadSeverity::Warning]
    );
    assert_eq!(obs.alerts.lock().unwrap().len(), 2);
}

#[test]
fn composite_fans_out_and_file_observer_appends() {
    let log_path = tmp_file("log");
    let recorder = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn LoadObserver>> =
        vec![recorder.clone(), Arc::new(FileObserver::new(&log_path))];
    let composite = CompositeObserver::new(observers);
    let opts = LoadOptions {
        observer: Some(Arc::new(composite)),
        alert_at_or_above: LoadSeverity::Critical,
    };

    load_from_path("tests/fixtures/people.csv", &opts).unwrap();
    let _ = load_from_path("missing.sas7bdat", &opts).unwrap_err();

    let log = std::fs::read_to_string(&log_path).unwrap();
    let _ = std::fs::remove_file(&log_path);

    assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    assert_eq!(*recorder.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("ok format=csv") && lines[0].contains("rows=2 columns=2"));
    assert!(lines[1].contains("fail severity=Critical format=sas7bdat"));
    assert!(lines[2].contains("ALERT") && lines[2].contains("File not found: missing.sas7bdat"));
}
