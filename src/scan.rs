//! Discovery of loadable files under a data directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ingestion::FileFormat;

/// Every file under `dir` (recursively) whose extension has a reader.
///
/// Paths come back in traversal order. A missing or unreadable `dir` yields an empty list;
/// entries that cannot be read are skipped.
pub fn supported_files(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) if e.depth() == 0 => {
                log::warn!("cannot scan {}: {e}", dir.display());
                None
            }
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// `true` when the extension (case-insensitive) names a supported format.
pub fn is_supported(path: &Path) -> bool {
    FileFormat::from_path(path).is_supported()
}

/// The first path whose base name equals `name` exactly.
pub fn find_by_name<'a>(files: &'a [PathBuf], name: &str) -> Option<&'a Path> {
    files
        .iter()
        .find(|p| p.file_name().is_some_and(|n| n == name))
        .map(PathBuf::as_path)
}

/// Base names of `files`, in order.
pub fn display_names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_ignores_case() {
        assert!(is_supported(Path::new("a/B.CSV")));
        assert!(is_supported(Path::new("x.Sas7bdat")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("csv")));
    }

    #[test]
    fn first_exact_name_wins() {
        let files = vec![
            PathBuf::from("d/one/a.csv"),
            PathBuf::from("d/two/a.csv"),
            PathBuf::from("d/b.xpt"),
        ];
        assert_eq!(find_by_name(&files, "a.csv"), Some(Path::new("d/one/a.csv")));
        assert_eq!(find_by_name(&files, "A.csv"), None);
        assert_eq!(display_names(&files), ["a.csv", "a.csv", "b.xpt"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(supported_files("/definitely/not/here/table-viewer").is_empty());
    }
}
