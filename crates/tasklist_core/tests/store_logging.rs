use std::fs;
use std::path::Path;
use tasklist_core::{init_logging, DiskStore, StoreError};

fn read_logs(log_dir: &Path) -> String {
    let mut text = String::new();
    for entry in fs::read_dir(log_dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_file() {
            text.push_str(&fs::read_to_string(path).unwrap_or_default());
        }
    }
    text
}

#[test]
fn load_failures_emit_store_load_events() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    init_logging("info", &log_dir).unwrap();

    let data_dir = dir.path().join("data");
    let store = DiskStore::new("lists.json", &data_dir);
    assert!(matches!(store.load(), Err(StoreError::NotFound(_))));

    fs::create_dir_all(&data_dir).unwrap();
    fs::write(store.path(), b"{ not json").unwrap();
    assert!(matches!(store.load(), Err(StoreError::DecodeFailed { .. })));

    log::logger().flush();
    let text = read_logs(&log_dir);
    assert!(
        text.contains("event=store_load module=store status=not_found duration_ms="),
        "missing not_found event in:\n{text}"
    );
    assert!(
        text.contains("event=store_load module=store status=error duration_ms="),
        "missing error event in:\n{text}"
    );
    assert!(text.contains("error_code=decode_failed"));
}
