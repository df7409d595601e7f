use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use table_viewer::ingestion::csv::{read_csv_from_path, read_sample, SAMPLE_CHARS};
use table_viewer::ingestion::detect_delimiter;
use table_viewer::types::Value;
use table_viewer::ReadError;

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("table-viewer-csv-{nanos}.{ext}"))
}

#[test]
fn fixture_keeps_headers_and_cells_verbatim() {
    let f = read_csv_from_path("tests/fixtures/people.csv").unwrap();

    assert_eq!(f.shape(), (2, 2));
    assert_eq!(f.columns(), ["name ", " age "]);
    assert_eq!(f.rows()[0][0], Value::Utf8(" Alice ".to_string()));
    // numeric parsing tolerates the surrounding spaces
    assert_eq!(f.value(1, " age "), Some(&Value::Int64(25)));
}

#[test]
fn semicolon_fallback_when_no_comma_or_dollar_in_sample() {
    let path = tmp_file("csv");
    std::fs::write(&path, "id;note\n1;x\n2;NA\n").unwrap();
    let f = read_csv_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(f.columns(), ["id", "note"]);
    assert_eq!(f.column("id").unwrap(), vec![&Value::Int64(1), &Value::Int64(2)]);
    assert_eq!(f.value(1, "note"), Some(&Value::Null));
}

#[test]
fn dollar_delimited_file() {
    let path = tmp_file("csv");
    std::fs::write(&path, "a$b\n1.5$true\n2$false\n").unwrap();
    let f = read_csv_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(
        f.column("a").unwrap(),
        vec![&Value::Float64(1.5), &Value::Float64(2.0)]
    );
    assert_eq!(f.column("b").unwrap(), vec![&Value::Bool(true), &Value::Bool(false)]);
}

#[test]
fn delimiter_only_looks_at_the_sample() {
    let path = tmp_file("csv");
    let mut body = String::from("a;b\n");
    while body.len() < SAMPLE_CHARS + 10 {
        body.push_str("1;2\n");
    }
    body.push_str("3,4;5\n");
    std::fs::write(&path, &body).unwrap();

    let sample = read_sample(&path, SAMPLE_CHARS).unwrap();
    assert_eq!(sample.chars().count(), SAMPLE_CHARS);
    assert_eq!(detect_delimiter(&sample), b';');

    let f = read_csv_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(f.columns(), ["a", "b"]);
    assert_eq!(f.rows().last().unwrap()[0], Value::Utf8("3,4".to_string()));
}

#[test]
fn ragged_file_is_malformed() {
    let path = tmp_file("csv");
    std::fs::write(&path, "a,b\n1,2,3\n").unwrap();
    let err = read_csv_from_path(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);

    assert!(matches!(err, ReadError::Malformed { .. }));
}

#[test]
fn invalid_utf8_in_sample_is_reported() {
    let path = tmp_file("csv");
    std::fs::write(&path, b"a,b\n\xff\xfe,1\n").unwrap();
    let err = read_csv_from_path(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);

    assert!(matches!(err, ReadError::Utf8(_)));
}
