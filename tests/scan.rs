use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use table_viewer::scan::{display_names, find_by_name, supported_files};

fn tmp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("table-viewer-scan-{nanos}"))
}

#[test]
fn recursive_scan_keeps_only_supported_files() {
    let dir = tmp_dir();
    std::fs::create_dir_all(dir.join("nested/deeper")).unwrap();
    std::fs::create_dir_all(dir.join("folder.csv")).unwrap();
    for name in ["a.csv", "notes.txt", "nested/b.XLSX", "nested/deeper/c.sas7bdat", "nested/d.xpt", "e.xls"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    let files = supported_files(&dir);
    let mut names = display_names(&files);
    names.sort();
    let found = find_by_name(&files, "c.sas7bdat").map(Path::to_path_buf);
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(names, ["a.csv", "b.XLSX", "c.sas7bdat", "d.xpt"]);
    assert_eq!(found, Some(dir.join("nested/deeper/c.sas7bdat")));
}

#[test]
fn missing_directory_yields_nothing() {
    assert!(supported_files(tmp_dir().join("absent")).is_empty());
}
