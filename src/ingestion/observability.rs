//! Load outcome reporting for [`super::load_from_path`].
//!
//! Every failed load is graded by its [`LoadError`] variant, reported through
//! [`LoadObserver::on_failure`], and escalated to [`LoadObserver::on_alert`] once the grade reaches
//! [`super::LoadOptions::alert_at_or_above`]. Parse failures carry the reader's reason in the
//! logged text even though the user-facing message omits it.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::LoadError;

use super::unified::FileFormat;

/// How bad a failed load is. Ordered, so a threshold such as `>= Error` selects alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Not produced for failures; available as a threshold that alerts on everything.
    Info,
    /// [`LoadError::Empty`] and [`LoadError::UnsupportedExtension`]: the user picked a file with
    /// nothing to show.
    Warning,
    /// [`LoadError::Parse`] and [`LoadError::Unexpected`]: the bytes were read but not understood.
    Error,
    /// [`LoadError::NotFound`] and [`LoadError::Io`]: the data directory itself is in trouble.
    Critical,
}

impl LoadSeverity {
    /// The `log` level [`LogObserver`] uses for a failure of this severity. `Error` and
    /// `Critical` share `log::Level::Error`.
    pub fn log_level(self) -> log::Level {
        match self {
            LoadSeverity::Info => log::Level::Info,
            LoadSeverity::Warning => log::Level::Warn,
            LoadSeverity::Error | LoadSeverity::Critical => log::Level::Error,
        }
    }
}

/// Which file a reported load was for.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// The path as given to [`super::load_from_path`], not canonicalized.
    pub path: PathBuf,
    /// Reader picked from the extension; [`FileFormat::Unsupported`] when none matched.
    pub format: FileFormat,
}

/// Shape of the frame a successful load produced, before cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows, excluding the header.
    pub rows: usize,
    pub columns: usize,
}

/// Receives the outcome of each [`super::load_from_path`] call. All methods default to no-ops.
///
/// A failing load always gets `on_failure` first and, when its severity is at or above the
/// configured threshold, `on_alert` second.
pub trait LoadObserver: Send + Sync {
    /// The file loaded into a frame of the given shape.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// The load failed; `severity` is derived from the `error` variant.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &LoadError) {}

    /// The failure reached `LoadOptions::alert_at_or_above`.
    ///
    /// Defaults to repeating [`Self::on_failure`], so an observer that only implements
    /// `on_failure` sees alerting failures twice.
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards each callback to every inner observer, in the order given, e.g. a [`LogObserver`]
/// next to a [`FileObserver`].
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Writes one `log` record per callback, shown on stderr through `env_logger`.
///
/// Successes go to `info` with the row and column counts. Failures use
/// [`LoadSeverity::log_level`], so a missing file logs at `error` and an empty one at `warn`.
/// Alerts always log at `error` with an `ALERT` prefix.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        log::info!(
            "loaded format={} path={} rows={} columns={}",
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        log::log!(
            severity.log_level(),
            "load failed severity={:?} format={} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            diagnostic(error)
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        log::error!(
            "ALERT severity={:?} format={} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            diagnostic(error)
        );
    }
}

/// Appends one line per callback to a text file, prefixed with Unix seconds.
///
/// Lines look like `1700000000 fail severity=Error format=csv path=data/x.csv err=...`.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// The file is opened per event and created if missing. Failing to write never affects the
    /// load being reported.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok format={} path={} rows={} columns={}",
            unix_ts(),
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            diagnostic(error)
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            diagnostic(error)
        ));
    }
}

/// User message plus the parse reason, which the message itself leaves out.
fn diagnostic(error: &LoadError) -> String {
    match error {
        LoadError::Parse { reason, .. } => format!("{error} ({reason})"),
        other => other.to_string(),
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_order_and_map_to_log_levels() {
        assert!(LoadSeverity::Warning < LoadSeverity::Error);
        assert!(LoadSeverity::Error < LoadSeverity::Critical);
        assert_eq!(LoadSeverity::Warning.log_level(), log::Level::Warn);
        assert_eq!(LoadSeverity::Critical.log_level(), log::Level::Error);
    }

    #[test]
    fn diagnostic_adds_parse_reason() {
        let parse = LoadError::Parse {
            name: "x.xpt".into(),
            reason: "bad header".into(),
        };
        assert_eq!(
            diagnostic(&parse),
            "Parsing error while reading file: x.xpt (bad header)"
        );
        let empty = LoadError::Empty { name: "e.csv".into() };
        assert_eq!(diagnostic(&empty), empty.to_string());
    }
}
