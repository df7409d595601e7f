//! Table cleaning for [`crate::types::Frame`].

use crate::types::{Frame, Value};

/// Returns a cleaned copy of `frame`; the input is never modified.
///
/// Steps, in order:
///
/// 1. trim whitespace around every column name
/// 2. trim whitespace around every text cell
/// 3. drop columns whose cells are all null
/// 4. drop rows whose remaining cells are all null
///
/// Survivors keep their relative order. A text cell that trims to `""` is still a value, so a
/// whitespace-only column is kept. Applying `clean` twice gives the same result as once.
pub fn clean(frame: &Frame) -> Frame {
    let columns: Vec<String> = frame.columns().iter().map(|c| c.trim().to_string()).collect();

    let keep: Vec<usize> = (0..columns.len())
        .filter(|&idx| frame.rows().iter().any(|row| !row[idx].is_null()))
        .collect();

    let rows: Vec<Vec<Value>> = frame
        .rows()
        .iter()
        .filter(|row| keep.iter().any(|&idx| !row[idx].is_null()))
        .map(|row| keep.iter().map(|&idx| trim_cell(&row[idx])).collect())
        .collect();

    let columns = keep.iter().map(|&idx| columns[idx].clone()).collect();
    Frame::from_parts(columns, rows)
}

fn trim_cell(value: &Value) -> Value {
    match value {
        Value::Utf8(s) => Value::Utf8(s.trim().to_string()),
        other => other.clone(),
    }
}
