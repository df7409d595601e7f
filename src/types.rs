//! Core data model: [`Value`] cells arranged in a [`Frame`].
//!
//! A frame is stored row-major: `rows[r][c]` is the cell of column `columns[c]` in row `r`.
//! Every frame instance carries a [`FrameId`] so caches can key on identity rather than content.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::FrameError;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/absent value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 text.
    Utf8(String),
}

impl Value {
    /// `true` for [`Value::Null`] and for a NaN [`Value::Float64`].
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float64(f) => f.is_nan(),
            _ => false,
        }
    }

    /// The text of a [`Value::Utf8`] cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) if v.is_nan() => Ok(()),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
        }
    }
}

/// Process-unique identity of a [`Frame`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FrameId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// In-memory table with named columns and ordered rows.
///
/// Equality compares columns and rows only. Cloning yields a new instance (a new [`FrameId`]).
#[derive(Debug, Serialize)]
pub struct Frame {
    #[serde(skip)]
    id: FrameId,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Create a frame from column names and row-major values.
    ///
    /// Fails if any row does not have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, FrameError> {
        let expected = columns.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(FrameError::RowWidth {
                row,
                expected,
                found: r.len(),
            });
        }
        Ok(Self::from_parts(columns, rows))
    }

    /// Create a frame from `(name, cells)` pairs; all columns must have the same length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Value>)>) -> Result<Self, FrameError> {
        let mut names = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            names.push(name.into());
            cols.push(cells);
        }

        let expected = cols.first().map(Vec::len).unwrap_or(0);
        for (name, cells) in names.iter().zip(&cols) {
            if cells.len() != expected {
                return Err(FrameError::ColumnLength {
                    column: name.clone(),
                    expected,
                    found: cells.len(),
                });
            }
        }

        let mut iters: Vec<_> = cols.into_iter().map(Vec::into_iter).collect();
        let rows = (0..expected)
            .map(|_| iters.iter_mut().filter_map(|it| it.next()).collect())
            .collect();
        Ok(Self::from_parts(names, rows))
    }

    /// Callers guarantee every row has `columns.len()` values.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            id: FrameId::next(),
            columns,
            rows,
        }
    }

    /// Identity of this instance.
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major cells.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// `true` when the frame has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.index_of(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// The cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.index_of(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Consume the frame into its column names and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

impl Clone for Frame {
    fn clone(&self) -> Self {
        Self::from_parts(self.columns.clone(), self.rows.clone())
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }
}

/// Make raw header cells usable as column names.
///
/// Blank cells become `Unnamed: <index>`; repeated names get `.1`, `.2`, ... suffixes so every
/// name is unique. Non-blank names are kept verbatim, whitespace included.
pub(crate) fn unique_column_names(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}
