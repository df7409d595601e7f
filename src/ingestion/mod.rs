//! Loading entrypoints and implementations.
//!
//! Most callers should use [`load_from_path`] (from [`unified`]) which:
//!
//! - picks the reader from the file extension (see [`FileFormat`])
//! - loads the file into an in-memory [`crate::types::Frame`]
//! - classifies failures into a [`crate::error::LoadError`]
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! Format-specific readers are also available under:
//! - [`csv`]
//! - [`excel`] (feature `excel`)
//! - [`sas7bdat`]
//! - [`xport`]

pub mod csv;
pub mod delimiter;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod sas7bdat;
pub mod sas_dates;
pub mod unified;
pub mod xport;

pub use delimiter::detect_delimiter;
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, LogObserver,
};
pub use unified::{load_from_path, read, FileFormat, LoadOptions, LoadRequest, FORMAT_TABLE};

/// Cell text treated as missing by the text-based readers.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub(crate) fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

/// Decode fixed-width text from a SAS file: UTF-8 when valid, Latin-1 otherwise.
pub(crate) fn decode_text(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_owned(),
        Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn na_tokens_are_exact_matches() {
        assert!(is_na_token(""));
        assert!(is_na_token("NA"));
        assert!(is_na_token("#N/A N/A"));
        assert!(!is_na_token(" "));
        assert!(!is_na_token("na"));
        assert!(!is_na_token(" NA"));
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(decode_text(b"caf\xe9"), "café");
        assert_eq!(decode_text("café".as_bytes()), "café");
    }
}
