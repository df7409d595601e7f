//! Plain-text presentation of load and clean outcomes.

use std::fmt::Write as _;

use crate::error::LoadResult;
use crate::types::Frame;

/// `"<rows> rows × <columns> columns"`.
pub fn shape_line(frame: &Frame) -> String {
    format!("{} rows × {} columns", frame.row_count(), frame.column_count())
}

/// Column names joined by `", "`.
pub fn columns_line(frame: &Frame) -> String {
    frame.columns().join(", ")
}

/// Column-aligned table with a header rule. Nulls render as empty cells.
///
/// With `max_rows`, only that many rows are printed, followed by a `... (<n> more rows)` line.
pub fn render_table(frame: &Frame, max_rows: Option<usize>) -> String {
    let shown = max_rows.unwrap_or(usize::MAX).min(frame.row_count());
    let cells: Vec<Vec<String>> = frame.rows()[..shown]
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = frame
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            cells
                .iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, frame.columns().iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }

    let hidden = frame.row_count() - shown;
    if hidden > 0 {
        let _ = writeln!(out, "... ({hidden} more rows)");
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| {
            let pad = w.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Full report for one selection: the failure message, a no-data notice, or the success
/// message followed by shape, columns and the table.
pub fn render_outcome(name: &str, cleaned: &LoadResult<impl AsRef<Frame>>, max_rows: Option<usize>) -> String {
    let frame = match cleaned {
        Ok(frame) => frame.as_ref(),
        Err(e) => return format!("Error: {e}\n"),
    };

    if frame.is_empty() {
        return format!("Warning: File {name} contains no data.\n");
    }

    let mut out = format!("Successfully loaded: {name}\n");
    let _ = writeln!(out, "Shape: {}", shape_line(frame));
    let _ = writeln!(out, "Columns: {}", columns_line(frame));
    out.push('\n');
    out.push_str(&render_table(frame, max_rows));
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::LoadError;
    use crate::types::Value;

    fn people() -> Frame {
        Frame::from_columns(vec![
            ("name", vec![Value::Utf8("Alice".into()), Value::Utf8("Bob".into())]),
            ("age", vec![Value::Int64(30), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn shape_and_columns() {
        let f = people();
        assert_eq!(shape_line(&f), "2 rows × 2 columns");
        assert_eq!(columns_line(&f), "name, age");
    }

    #[test]
    fn table_is_aligned() {
        let table = render_table(&people(), None);
        assert_eq!(table, "name   age\n-----  ---\nAlice  30\nBob\n");
    }

    #[test]
    fn table_row_limit() {
        let table = render_table(&people(), Some(1));
        assert!(table.ends_with("Alice  30\n... (1 more rows)\n"));
    }

    #[test]
    fn outcome_variants() {
        let ok: LoadResult<Arc<Frame>> = Ok(Arc::new(people()));
        let text = render_outcome("people.csv", &ok, None);
        assert!(text.starts_with("Successfully loaded: people.csv\nShape: 2 rows × 2 columns\nColumns: name, age\n"));

        let empty: LoadResult<Arc<Frame>> = Ok(Arc::new(Frame::from_columns::<&str>(vec![]).unwrap()));
        assert!(render_outcome("e.csv", &empty, None).contains("contains no data"));

        let err: LoadResult<Arc<Frame>> = Err(LoadError::NotFound { name: "x.csv".into() });
        assert_eq!(render_outcome("x.csv", &err, None), "Error: File not found: x.csv\n");
    }
}
