//! Loader collaborators feeding the store.

use std::io::Write;
use std::path::PathBuf;

use remap_core::services::loader::{DatasetLoader, FileLoader};
use remap_core::{FetchError, Phase, Record, Store};
use serde_json::json;

struct Fixed(Result<Vec<Record>, String>);

impl DatasetLoader for Fixed {
    fn load(&self) -> Result<Vec<Record>, FetchError> {
        self.0.clone().map_err(FetchError::Transport)
    }
}

#[test]
fn store_fetch_applies_success() {
    let records: Vec<Record> = serde_json::from_value(json!([{"color": "Red"}])).unwrap();
    let mut store = Store::new();

    let state = store.fetch(&Fixed(Ok(records.clone())));

    assert_eq!(state.phase(), Phase::Loaded);
    assert_eq!(state.dataset.rows().cloned().collect::<Vec<_>>(), records);
    assert_eq!(state.version, 2);
}

#[test]
fn store_fetch_applies_failure() {
    let mut store = Store::new();
    let state = store.fetch(&Fixed(Err("connection refused".into())));

    assert_eq!(state.phase(), Phase::Errored);
    assert_eq!(state.errors.as_deref(), Some("request failed: connection refused"));
    assert!(!state.loaded);
}

#[test]
fn file_loader_reads_utf8_with_bom() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xEF, 0xBB, 0xBF]).unwrap();
    file.write_all(r#"[{"color":"Vermelho"},{"color":"Azul"}]"#.as_bytes())
        .unwrap();

    let records = FileLoader {
        path: file.path().to_path_buf(),
    }
    .load()
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["color"], "Vermelho");
}

#[test]
fn file_loader_reports_bad_rows() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"color":"Red"}}, "Blue"]"#).unwrap();

    let err = FileLoader {
        path: file.path().to_path_buf(),
    }
    .load()
    .unwrap_err();

    assert!(matches!(err, FetchError::Record { index: 1, .. }));
}

#[test]
fn file_loader_reports_missing_file() {
    let err = FileLoader {
        path: PathBuf::from("/definitely/not/here.json"),
    }
    .load()
    .unwrap_err();

    assert!(matches!(err, FetchError::Read { .. }));
}
