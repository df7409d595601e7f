//! Unified loading entrypoint.
//!
//! Most callers should use [`read`] or [`load_from_path`], which load a file into an in-memory
//! [`crate::types::Frame`]:
//!
//! - The format is chosen from the lowercased file extension via [`FileFormat::from_extension`].
//! - Every failure is classified into one [`LoadError`] whose `Display` is the user-facing message.
//! - If a [`super::observability::LoadObserver`] is configured, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{LoadError, LoadResult, ReadError, ReadResult};
use crate::types::Frame;

use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::{csv, sas7bdat, xport};

/// Loading strategy selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Delimited text (`.csv`).
    Csv,
    /// Excel workbook (`.xlsx`).
    Spreadsheet,
    /// SAS dataset (`.sas7bdat`).
    SasDataset,
    /// SAS transport (`.xpt`).
    SasTransport,
    /// Anything else.
    Unsupported,
}

/// Extension (lowercase, without the dot) → strategy.
pub const FORMAT_TABLE: [(&str, FileFormat); 4] = [
    ("csv", FileFormat::Csv),
    ("xlsx", FileFormat::Spreadsheet),
    ("sas7bdat", FileFormat::SasDataset),
    ("xpt", FileFormat::SasTransport),
];

impl FileFormat {
    /// Look up a format from a file extension (case-insensitive, leading dot optional).
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        FORMAT_TABLE
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, f)| *f)
            .unwrap_or(FileFormat::Unsupported)
    }

    /// Look up a format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileFormat::Unsupported)
    }

    pub fn is_supported(self) -> bool {
        self != FileFormat::Unsupported
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "csv",
            FileFormat::Spreadsheet => "xlsx",
            FileFormat::SasDataset => "sas7bdat",
            FileFormat::SasTransport => "xpt",
            FileFormat::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Options controlling [`load_from_path`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Load a file with default options.
///
/// ```no_run
/// use table_viewer::ingestion::read;
///
/// match read("data/people.csv") {
///     Ok(frame) => println!("{} rows", frame.row_count()),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
pub fn read(path: impl AsRef<Path>) -> LoadResult<Frame> {
    load_from_path(path, &LoadOptions::default())
}

/// Unified load entry point.
///
/// Dispatches on the lowercased extension (see [`FORMAT_TABLE`]). Unsupported extensions fail
/// without touching the file. For supported ones the path is checked first, so a missing file is
/// always reported as [`LoadError::NotFound`] whatever the format.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ## Observability (log facade + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use table_viewer::ingestion::{load_from_path, LoadOptions, LoadSeverity, LogObserver};
///
/// let opts = LoadOptions {
///     observer: Some(Arc::new(LogObserver)),
///     alert_at_or_above: LoadSeverity::Critical,
/// };
///
/// // Missing files are Critical and trigger `on_alert` at this threshold.
/// let err = load_from_path("does_not_exist.csv", &opts).unwrap_err();
/// assert!(err.to_string().starts_with("File not found"));
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<Frame> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path);
    let ctx = LoadContext {
        path: path.to_path_buf(),
        format,
    };

    let result = load_with_format(path, format);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(frame) => obs.on_success(
                &ctx,
                LoadStats {
                    rows: frame.row_count(),
                    columns: frame.column_count(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

type Reader = fn(&Path) -> ReadResult<Frame>;

fn load_with_format(path: &Path, format: FileFormat) -> LoadResult<Frame> {
    let reader: Reader = match format {
        FileFormat::Csv => |p| csv::read_csv_from_path(p),
        FileFormat::Spreadsheet => read_excel_dispatch,
        FileFormat::SasDataset => |p| sas7bdat::read_sas7bdat_from_path(p),
        FileFormat::SasTransport => |p| xport::read_xport_from_path(p),
        FileFormat::Unsupported => {
            return Err(LoadError::UnsupportedExtension {
                extension: display_extension(path),
            })
        }
    };

    let name = file_name(path);
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadError::NotFound { name }),
        Err(source) => return Err(LoadError::Io { name, source }),
    };
    if meta.is_file() && meta.len() == 0 {
        return Err(LoadError::Empty { name });
    }

    reader(path).map_err(|e| classify(name, e))
}

/// Map a reader failure onto the user-facing taxonomy.
fn classify(name: String, err: ReadError) -> LoadError {
    if let Some(io_err) = find_io_error(&err) {
        return match io_err.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound { name },
            kind => LoadError::Io {
                name,
                source: io::Error::new(kind, io_err.to_string()),
            },
        };
    }

    match err {
        ReadError::Empty => LoadError::Empty { name },
        ReadError::Malformed { .. } => LoadError::Parse {
            name,
            reason: err.to_string(),
        },
        ReadError::Csv(ref e) if matches!(e.kind(), ::csv::ErrorKind::UnequalLengths { .. }) => {
            LoadError::Parse {
                name,
                reason: err.to_string(),
            }
        }
        #[cfg(feature = "excel")]
        ReadError::Excel(_) => LoadError::Parse {
            name,
            reason: err.to_string(),
        },
        other => LoadError::Unexpected {
            name,
            details: detail_text(&other),
        },
    }
}

/// The innermost message of the error, without this crate's prefixes.
fn detail_text(err: &ReadError) -> String {
    match err {
        ReadError::Io(e) => e.to_string(),
        ReadError::Csv(e) => e.to_string(),
        ReadError::Utf8(e) => e.to_string(),
        other => other.to_string(),
    }
}

fn find_io_error(err: &ReadError) -> Option<&io::Error> {
    if let ReadError::Io(e) = err {
        return Some(e);
    }
    if let ReadError::Csv(e) = err {
        if let ::csv::ErrorKind::Io(io_err) = e.kind() {
            return Some(io_err);
        }
    }
    error_chain_io(err)
}

fn error_chain_io<'a>(e: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        cur = err.source();
    }
    None
}

fn read_excel_dispatch(path: &Path) -> ReadResult<Frame> {
    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_from_path(path)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = path;
        Err(ReadError::Unavailable(
            "excel loading not enabled (enable cargo feature 'excel')".to_string(),
        ))
    }
}

/// Base name of a path, for messages.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Lowercased extension with its leading dot, or `""` if there is none.
fn display_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn severity_for_error(e: &LoadError) -> LoadSeverity {
    match e {
        LoadError::NotFound { .. } | LoadError::Io { .. } => LoadSeverity::Critical,
        LoadError::Parse { .. } | LoadError::Unexpected { .. } => LoadSeverity::Error,
        LoadError::Empty { .. } | LoadError::UnsupportedExtension { .. } => LoadSeverity::Warning,
    }
}

/// Convenience helper for callers that want an owned request object.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling loading.
    pub options: LoadOptions,
}

impl LoadRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: LoadOptions::default(),
        }
    }

    /// Execute the request by calling [`load_from_path`].
    pub fn run(&self) -> LoadResult<Frame> {
        load_from_path(&self.path, &self.options)
    }
}
