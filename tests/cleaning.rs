use std::sync::Arc;

use table_viewer::ingestion::read;
use table_viewer::processing::{clean, CacheStats, CleaningCache};
use table_viewer::types::{Frame, Value};

fn s(v: &str) -> Value {
    Value::Utf8(v.to_string())
}

fn messy() -> Frame {
    Frame::from_columns(vec![
        (" name ", vec![s(" Alice "), s(" Bob "), Value::Null]),
        (" age ", vec![s(" 30"), s("25"), Value::Null]),
        ("empty", vec![Value::Null, Value::Null, Value::Null]),
    ])
    .unwrap()
}

#[test]
fn trims_and_drops_empty_column_and_row() {
    let out = clean(&messy());

    assert_eq!(out.columns(), ["name", "age"]);
    assert_eq!(out.row_count(), 2);
    assert_eq!(out.rows()[0], vec![s("Alice"), s("30")]);
    assert_eq!(out.rows()[1], vec![s("Bob"), s("25")]);
}

#[test]
fn cleaning_is_idempotent() {
    let once = clean(&messy());
    let twice = clean(&once);
    assert_eq!(once, twice);
}

#[test]
fn survivors_keep_their_order() {
    let f = Frame::from_columns(vec![
        ("c", vec![Value::Int64(1), Value::Null, Value::Int64(3), Value::Null]),
        ("x", vec![Value::Null, Value::Null, Value::Null, Value::Null]),
        ("a", vec![Value::Null, Value::Null, s("z"), s("w")]),
        ("b", vec![Value::Bool(true), Value::Null, Value::Null, Value::Null]),
    ])
    .unwrap();

    let out = clean(&f);
    assert_eq!(out.columns(), ["c", "a", "b"]);
    assert_eq!(
        out.column("c").unwrap(),
        vec![&Value::Int64(1), &Value::Int64(3), &Value::Null]
    );
    assert_eq!(out.column("a").unwrap(), vec![&Value::Null, &s("z"), &s("w")]);
}

#[test]
fn loaded_csv_cleans_to_trimmed_names() {
    let out = clean(&read("tests/fixtures/people.csv").unwrap());
    assert_eq!(out.columns(), ["name", "age"]);
    assert_eq!(out.rows()[0], vec![s("Alice"), Value::Int64(30)]);
}

#[test]
fn cache_is_keyed_by_instance() {
    let frame = messy();
    let copy = frame.clone();
    assert_eq!(frame, copy);
    assert_ne!(frame.id(), copy.id());

    let mut cache = CleaningCache::new();
    let first = cache.clean(&frame);
    let again = cache.clean(&frame);
    let other = cache.clean(&copy);

    assert!(Arc::ptr_eq(&first, &again));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(*first, *other);
    assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
}
