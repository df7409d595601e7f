#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use table_viewer::ingestion::excel::read_excel_from_path;
use table_viewer::ingestion::read;
use table_viewer::processing::clean;
use table_viewer::types::Value;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("table-viewer-{name}-{nanos}.xlsx"))
}

fn write_people_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("People").unwrap();

    // header, with padding and a blank cell
    ws.write_string(0, 0, " id ").unwrap();
    ws.write_string(0, 1, "name").unwrap();
    ws.write_string(0, 3, "score").unwrap();

    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, " Ada ").unwrap();
    ws.write_number(1, 3, 98.5).unwrap();

    ws.write_number(2, 0, 2).unwrap();
    ws.write_string(2, 1, "NA").unwrap();
    ws.write_boolean(2, 3, true).unwrap();

    // a second sheet is ignored
    let other = wb.add_worksheet();
    other.write_string(0, 0, "ignored").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn first_sheet_is_loaded_with_header_row() {
    let path = tmp_file("people");
    write_people_xlsx(&path);
    let f = read_excel_from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(f.columns(), [" id ", "name", "Unnamed: 2", "score"]);
    assert_eq!(f.row_count(), 2);
    assert_eq!(
        f.rows()[0],
        vec![
            Value::Int64(1),
            Value::Utf8(" Ada ".to_string()),
            Value::Null,
            Value::Float64(98.5),
        ]
    );
    assert_eq!(f.value(1, "name"), Some(&Value::Null));
    assert_eq!(f.value(1, "score"), Some(&Value::Bool(true)));
}

#[test]
fn unified_load_then_clean() {
    let path = tmp_file("people-clean");
    write_people_xlsx(&path);
    let f = clean(&read(&path).unwrap());
    let _ = std::fs::remove_file(&path);

    assert_eq!(f.columns(), ["id", "name", "score"]);
    assert_eq!(f.rows()[0][1], Value::Utf8("Ada".to_string()));
}
