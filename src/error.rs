use thiserror::Error;

/// Convenience result type for [`crate::ingestion::load_from_path`].
pub type LoadResult<T> = Result<T, LoadError>;

/// Convenience result type for the format-specific readers.
pub type ReadResult<T> = Result<T, ReadError>;

/// User-facing load failure.
///
/// The `Display` output of every variant is the message shown to the user; `name` is always the
/// file's base name. Variants that carry a `reason` keep the underlying diagnostic for logging
/// without putting it into the message.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not exist.
    #[error("File not found: {name}")]
    NotFound { name: String },

    /// The file exists but has no parsable rows or columns.
    #[error("File is empty or has no data: {name}")]
    Empty { name: String },

    /// Content is malformed for the detected format (ragged CSV, corrupt workbook, bad SAS header).
    #[error("Parsing error while reading file: {name}")]
    Parse { name: String, reason: String },

    /// Underlying storage failure (permissions, disk error, truncated read).
    #[error("I/O error while reading file {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The extension is not one of the supported formats. The file is never opened.
    #[error("Unsupported file extension: {extension}")]
    UnsupportedExtension { extension: String },

    /// Anything else; `details` preserves the underlying error text.
    #[error("Unexpected error while reading {name}: {details}")]
    Unexpected { name: String, details: String },
}

impl LoadError {
    /// The base name this error refers to, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            LoadError::NotFound { name }
            | LoadError::Empty { name }
            | LoadError::Parse { name, .. }
            | LoadError::Io { name, .. }
            | LoadError::Unexpected { name, .. } => Some(name),
            LoadError::UnsupportedExtension { .. } => None,
        }
    }
}

/// Failure raised by a format reader before it is classified into a [`LoadError`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Workbook error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The file holds no header / no columns.
    #[error("no columns to parse from file")]
    Empty,

    /// Structurally invalid content.
    #[error("malformed {format}: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    /// Text that is not valid UTF-8 where UTF-8 is required.
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Format support compiled out.
    #[error("{0}")]
    Unavailable(String),
}

impl ReadError {
    pub(crate) fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        ReadError::Malformed {
            format,
            message: message.into(),
        }
    }
}

/// A [`crate::types::Frame`] constructor was given data that breaks the equal-length invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A row does not have one value per column.
    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A column's length differs from the first column's.
    #[error("column '{column}' has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}
