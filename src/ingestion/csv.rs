//! CSV loading.
//!
//! The delimiter is chosen from a sample of the file's first characters (see
//! [`super::delimiter::detect_delimiter`]). Headers are kept verbatim; trimming is the cleaner's
//! job, not the loader's.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::types::{unique_column_names, Frame, Value};

use super::delimiter::detect_delimiter;
use super::is_na_token;

/// Number of characters inspected by the delimiter detector.
pub const SAMPLE_CHARS: usize = 1024;

/// Load a CSV file into a [`Frame`].
///
/// Rules:
///
/// - The delimiter comes from the first [`SAMPLE_CHARS`] characters of the file.
/// - The first record is the header row, kept verbatim.
/// - Short records are padded with nulls; a record longer than the header is malformed.
/// - Blank lines are skipped. A file without a header record is [`ReadError::Empty`].
pub fn read_csv_from_path(path: impl AsRef<Path>) -> ReadResult<Frame> {
    let path = path.as_ref();
    let sample = read_sample(path, SAMPLE_CHARS)?;
    let delimiter = detect_delimiter(&sample);
    log::debug!(
        "csv delimiter {:?} detected for {}",
        delimiter as char,
        path.display()
    );

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Load CSV data from an existing reader.
///
/// The reader should be configured with `has_headers(true)` and `flexible(true)`; a non-flexible
/// reader reports ragged rows itself, which surfaces as the same malformed-content error.
pub fn read_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> ReadResult<Frame> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(ReadError::Empty);
    }
    let width = headers.len();
    let columns = unique_column_names(headers.iter().map(str::to_owned).collect());

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for result in rdr.records() {
        let record = result?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(ReadError::malformed(
                "csv",
                format!("expected {width} fields in line {line}, saw {}", record.len()),
            ));
        }
        for (idx, cells) in raw.iter_mut().enumerate() {
            let cell = record.get(idx).filter(|s| !is_na_token(s));
            cells.push(cell.map(str::to_owned));
        }
    }

    let typed: Vec<Vec<Value>> = raw.into_iter().map(infer_column).collect();
    let row_count = typed.first().map(Vec::len).unwrap_or(0);
    let mut iters: Vec<_> = typed.into_iter().map(Vec::into_iter).collect();
    let rows = (0..row_count)
        .map(|_| iters.iter_mut().filter_map(|it| it.next()).collect())
        .collect();

    Ok(Frame::from_parts(columns, rows))
}

/// Read up to `max_chars` characters of UTF-8 text from the start of a file.
///
/// A multi-byte character cut by the read boundary is dropped; any other invalid byte sequence
/// is an error.
pub fn read_sample(path: &Path, max_chars: usize) -> ReadResult<String> {
    let mut buf = Vec::with_capacity(max_chars * 4);
    File::open(path)?
        .take((max_chars * 4) as u64)
        .read_to_end(&mut buf)?;

    let text = match std::str::from_utf8(&buf) {
        Ok(text) => text,
        // `error_len() == None` means the input simply ended mid-character.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&buf[..e.valid_up_to()]).map_err(ReadError::Utf8)?
        }
        Err(e) => return Err(ReadError::Utf8(e)),
    };
    Ok(text.chars().take(max_chars).collect())
}

/// Type one column: all-integer → `Int64`, all-numeric → `Float64`, all-boolean → `Bool`,
/// otherwise verbatim text. Nulls never affect the choice.
fn infer_column(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || cells.iter().flatten();

    if present().all(|s| s.trim().parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c {
                Some(s) => s.trim().parse::<i64>().map(Value::Int64).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
    }
    if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c {
                Some(s) => s.trim().parse::<f64>().map(Value::Float64).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
    }
    if present().all(|s| parse_bool(s).is_some()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(parse_bool).map_or(Value::Null, Value::Bool))
            .collect();
    }

    cells
        .into_iter()
        .map(|c| c.map_or(Value::Null, Value::Utf8))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}
