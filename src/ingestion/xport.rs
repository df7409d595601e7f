//! SAS transport (`.xpt`, XPORT v5/v8) loading.
//!
//! An XPORT file is a sequence of 80-byte records. Only the first member is read. A numeric
//! variable's format decides whether it is rendered as a date, datetime or time; labels and
//! other member metadata are skipped.

use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::types::{unique_column_names, Frame, Value};

use super::decode_text;
use super::sas_dates::Temporal;

const RECORD: usize = 80;
const FORMAT: &str = "xpt";

const LIBRARY_V5: &[u8] = b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";
const LIBRARY_V8: &[u8] = b"HEADER RECORD*******LIBV8   HEADER RECORD!!!!!!!";
const MEMBER_PREFIX: &[u8] = b"HEADER RECORD*******MEMB";
const NAMESTR_PREFIX: &[u8] = b"HEADER RECORD*******NAM";
const OBS_PREFIX: &[u8] = b"HEADER RECORD*******OBS";

/// One variable as described by its NAMESTR record.
#[derive(Debug, Clone)]
struct Variable {
    name: String,
    numeric: bool,
    length: usize,
    position: usize,
    temporal: Option<Temporal>,
}

/// Load the first member of a SAS transport file into a [`Frame`].
pub fn read_xport_from_path(path: impl AsRef<Path>) -> ReadResult<Frame> {
    let bytes = std::fs::read(path)?;
    read_xport_from_bytes(&bytes)
}

/// Decode an in-memory SAS transport file.
pub fn read_xport_from_bytes(bytes: &[u8]) -> ReadResult<Frame> {
    if bytes.is_empty() {
        return Err(ReadError::Empty);
    }
    let header = record(bytes, 0)?;
    let v8 = if header.starts_with(LIBRARY_V5) {
        false
    } else if header.starts_with(LIBRARY_V8) {
        true
    } else {
        return Err(ReadError::malformed(FORMAT, "missing library header record"));
    };

    // library header, two real-header records, then the member header
    let member_idx = 3;
    let member = record(bytes, member_idx)?;
    if !member.starts_with(MEMBER_PREFIX) {
        return Err(ReadError::malformed(FORMAT, "missing member header record"));
    }
    let namestr_len = parse_digits(&member[74..78]).unwrap_or(140);
    if namestr_len != 140 && namestr_len != 136 {
        return Err(ReadError::malformed(
            FORMAT,
            format!("unsupported NAMESTR length {namestr_len}"),
        ));
    }

    // member header, descriptor header, two descriptor records, then the NAMESTR header
    let namestr_idx = member_idx + 4;
    let namestr_header = record(bytes, namestr_idx)?;
    if !namestr_header.starts_with(NAMESTR_PREFIX) {
        return Err(ReadError::malformed(FORMAT, "missing NAMESTR header record"));
    }
    let nvars = parse_digits(&namestr_header[48..58])
        .ok_or_else(|| ReadError::malformed(FORMAT, "unreadable variable count"))?;
    if nvars == 0 {
        return Err(ReadError::Empty);
    }

    let vars_start = (namestr_idx + 1) * RECORD;
    let vars_end = vars_start + nvars * namestr_len;
    let descriptors = bytes
        .get(vars_start..vars_end)
        .ok_or_else(|| ReadError::malformed(FORMAT, "truncated NAMESTR records"))?;
    let variables = descriptors
        .chunks_exact(namestr_len)
        .map(|ns| parse_namestr(ns, v8))
        .collect::<ReadResult<Vec<_>>>()?;

    // Skip label/format extension records until the observation header.
    let mut idx = vars_end.div_ceil(RECORD);
    loop {
        let rec = record(bytes, idx)?;
        idx += 1;
        if rec.starts_with(OBS_PREFIX) {
            break;
        }
    }
    let data = &bytes[idx * RECORD..];

    let obs_len: usize = variables.iter().map(|v| v.position + v.length).max().unwrap_or(0);
    if obs_len == 0 {
        return Err(ReadError::Empty);
    }
    let rows = read_observations(data, obs_len, &variables)?;

    let columns = unique_column_names(variables.into_iter().map(|v| v.name).collect());
    Ok(Frame::from_parts(columns, rows))
}

fn read_observations(data: &[u8], obs_len: usize, vars: &[Variable]) -> ReadResult<Vec<Vec<Value>>> {
    let mut rows = Vec::new();
    let mut offset = 0;
    while offset + obs_len <= data.len() {
        let rest = &data[offset..];
        if offset % RECORD == 0 && rest.starts_with(MEMBER_PREFIX) {
            break;
        }
        // Final record padding is blanks.
        if rest.len() < RECORD && rest.iter().all(|&b| b == b' ') {
            break;
        }

        let obs = &rest[..obs_len];
        rows.push(vars.iter().map(|v| decode_cell(obs, v)).collect::<ReadResult<_>>()?);
        offset += obs_len;
    }
    Ok(rows)
}

fn decode_cell(obs: &[u8], var: &Variable) -> ReadResult<Value> {
    let raw = obs
        .get(var.position..var.position + var.length)
        .ok_or_else(|| ReadError::malformed(FORMAT, format!("variable '{}' exceeds observation", var.name)))?;

    if !var.numeric {
        let trimmed = raw
            .iter()
            .rposition(|&b| b != b' ' && b != 0)
            .map_or(&raw[..0], |end| &raw[..=end]);
        return Ok(Value::Utf8(decode_text(trimmed)));
    }

    Ok(match (ibm_to_f64(raw), var.temporal) {
        (None, _) => Value::Null,
        (Some(v), Some(temporal)) => temporal.render(v),
        (Some(v), None) => Value::Float64(v),
    })
}

fn parse_namestr(ns: &[u8], v8: bool) -> ReadResult<Variable> {
    let ntype = be_u16(&ns[0..2]);
    let length = be_u16(&ns[4..6]) as usize;
    let short_name = trim_text(&ns[8..16]);
    let format = trim_text(&ns[56..64]);
    let position = u32::from_be_bytes([ns[84], ns[85], ns[86], ns[87]]) as usize;

    let name = if v8 && ns.len() >= 120 {
        let long = trim_text(&ns[88..120]);
        if long.is_empty() { short_name } else { long }
    } else {
        short_name
    };

    let numeric = match ntype {
        1 => true,
        2 => false,
        other => {
            return Err(ReadError::malformed(
                FORMAT,
                format!("variable '{name}' has unknown type {other}"),
            ));
        }
    };
    if numeric && !(2..=8).contains(&length) {
        return Err(ReadError::malformed(
            FORMAT,
            format!("numeric variable '{name}' has length {length}"),
        ));
    }

    Ok(Variable {
        name,
        numeric,
        length,
        position,
        temporal: if numeric { Temporal::from_format(&format) } else { None },
    })
}

/// Convert an IBM/370 hexadecimal float (2 to 8 big-endian bytes) to an IEEE double.
///
/// Returns `None` for SAS missing values: a first byte of `.`, `_` or `A`-`Z` followed by zeros.
pub fn ibm_to_f64(raw: &[u8]) -> Option<f64> {
    let mut b = [0u8; 8];
    let n = raw.len().min(8);
    b[..n].copy_from_slice(&raw[..n]);

    if b[1..].iter().all(|&x| x == 0) && matches!(b[0], b'.' | b'_' | b'A'..=b'Z') {
        return None;
    }

    let negative = b[0] & 0x80 != 0;
    let exponent = i32::from(b[0] & 0x7f) - 64;
    let mantissa = u64::from_be_bytes([0, b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
    if mantissa == 0 {
        return Some(0.0);
    }

    // value = 0.mantissa (56 bits) * 16^exponent
    let magnitude = mantissa as f64 * 2f64.powi(4 * exponent - 56);
    Some(if negative { -magnitude } else { magnitude })
}

fn record(bytes: &[u8], idx: usize) -> ReadResult<&[u8]> {
    bytes
        .get(idx * RECORD..(idx + 1) * RECORD)
        .ok_or_else(|| ReadError::malformed(FORMAT, format!("file ends before record {}", idx + 1)))
}

fn parse_digits(raw: &[u8]) -> Option<usize> {
    std::str::from_utf8(raw).ok()?.trim().parse().ok()
}

fn be_u16(raw: &[u8]) -> u16 {
    u16::from_be_bytes([raw[0], raw[1]])
}

fn trim_text(raw: &[u8]) -> String {
    decode_text(raw).trim_end_matches([' ', '\0']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ibm_float_known_values() {
        // 1.0 = 0x41100000_00000000
        assert_eq!(ibm_to_f64(&[0x41, 0x10, 0, 0, 0, 0, 0, 0]), Some(1.0));
        // -2.5 = 0xC1280000_00000000
        assert_eq!(ibm_to_f64(&[0xC1, 0x28, 0, 0, 0, 0, 0, 0]), Some(-2.5));
        // 100.0 = 0x42640000_00000000
        assert_eq!(ibm_to_f64(&[0x42, 0x64, 0, 0, 0, 0, 0, 0]), Some(100.0));
        // 0.5 = 0x40800000_00000000
        assert_eq!(ibm_to_f64(&[0x40, 0x80, 0, 0, 0, 0, 0, 0]), Some(0.5));
        assert_eq!(ibm_to_f64(&[0; 8]), Some(0.0));
    }

    #[test]
    fn ibm_float_truncated_length() {
        // 3-byte storage of 1.0
        assert_eq!(ibm_to_f64(&[0x41, 0x10, 0]), Some(1.0));
    }

    #[test]
    fn sas_missing_values() {
        assert_eq!(ibm_to_f64(&[b'.', 0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(ibm_to_f64(&[b'_', 0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(ibm_to_f64(&[b'Z', 0, 0, 0, 0, 0, 0, 0]), None);
        // 'A' with a non-zero mantissa is a real number
        assert!(ibm_to_f64(&[b'A', 0x10, 0, 0, 0, 0, 0, 0]).is_some());
    }

    #[test]
    fn rejects_non_xport_bytes() {
        let err = read_xport_from_bytes(&[b'x'; 400]).unwrap_err();
        assert!(matches!(err, ReadError::Malformed { .. }));
    }

    #[test]
    fn zero_bytes_is_empty() {
        assert!(matches!(read_xport_from_bytes(&[]), Err(ReadError::Empty)));
    }
}
