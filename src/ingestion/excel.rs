#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{ReadError, ReadResult};
use crate::types::{unique_column_names, Frame, Value};

use super::is_na_token;

/// Load the first sheet of a workbook (`.xlsx`) into a [`Frame`].
///
/// Behavior:
/// - The first row of the sheet's used range is the header row
/// - Blank header cells become `Unnamed: <index>`, repeated names get a numeric suffix
/// - Empty cells, error cells and NA-like strings are null
/// - Integral floats become integers; dates become `YYYY-MM-DD HH:MM:SS` text
pub fn read_excel_from_path(path: impl AsRef<Path>) -> ReadResult<Frame> {
    let mut workbook = open_workbook_auto(path)?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReadError::malformed("xlsx", "workbook has no sheets"))?;
    let range = workbook.worksheet_range(&first)?;

    read_sheet_range(&range)
}

fn read_sheet_range(range: &calamine::Range<Data>) -> ReadResult<Frame> {
    let mut rows_iter = range.rows();
    let header = rows_iter.next().ok_or(ReadError::Empty)?;
    let width = header.len();
    if width == 0 {
        return Err(ReadError::Empty);
    }

    let columns = unique_column_names(header.iter().map(cell_to_header_string).collect());
    let rows = rows_iter
        .map(|row| {
            (0..width)
                .map(|idx| convert_cell(row.get(idx).unwrap_or(&Data::Empty)))
                .collect()
        })
        .collect();

    Ok(Frame::from_parts(columns, rows))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_datetime(dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if is_na_token(s) => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) if f.is_nan() => Value::Null,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::Int64(*f as i64),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Utf8(format_datetime(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}

fn format_datetime(dt: &calamine::ExcelDateTime) -> String {
    dt.as_datetime()
        .map(|d| d.to_string())
        .unwrap_or_else(|| dt.as_f64().to_string())
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Range};

    use super::*;

    fn range(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut r = Range::new((0, 0), (height - 1, width - 1));
        for (ri, row) in cells.iter().enumerate() {
            for (ci, cell) in row.iter().enumerate() {
                r.set_value((ri as u32, ci as u32), cell.clone());
            }
        }
        r
    }

    #[test]
    fn header_row_and_typed_cells() {
        let r = range(&[
            &[Data::String(" id ".into()), Data::String("score".into()), Data::Empty],
            &[Data::Float(1.0), Data::Float(2.5), Data::String("NA".into())],
            &[Data::Int(2), Data::Empty, Data::Bool(true)],
        ]);
        let f = read_sheet_range(&r).unwrap();

        assert_eq!(f.columns(), [" id ", "score", "Unnamed: 2"]);
        assert_eq!(f.rows()[0], vec![Value::Int64(1), Value::Float64(2.5), Value::Null]);
        assert_eq!(f.rows()[1], vec![Value::Int64(2), Value::Null, Value::Bool(true)]);
    }

    #[test]
    fn header_only_sheet_has_zero_rows() {
        let r = range(&[&[Data::String("a".into()), Data::String("b".into())]]);
        assert_eq!(read_sheet_range(&r).unwrap().shape(), (0, 2));
    }

    #[test]
    fn empty_sheet_is_empty() {
        let r: Range<Data> = Range::empty();
        assert!(matches!(read_sheet_range(&r), Err(ReadError::Empty)));
    }
}
