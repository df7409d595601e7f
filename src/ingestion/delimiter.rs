//! Delimiter detection for `.csv` files.

/// Candidates in priority order; the first one found in the sample wins.
const CANDIDATES: [u8; 2] = [b',', b'$'];

/// Used when no candidate appears in the sample.
const FALLBACK: u8 = b';';

/// Pick the field delimiter for a CSV sample.
///
/// Comma if the sample contains one, else dollar sign if it contains one, else semicolon. There
/// is no quoting analysis or frequency counting.
pub fn detect_delimiter(sample: &str) -> u8 {
    CANDIDATES
        .iter()
        .copied()
        .find(|c| sample.as_bytes().contains(c))
        .unwrap_or(FALLBACK)
}
