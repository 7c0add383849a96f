//! JSON persistence sink shared by the file-backed stores.
//!
//! A store file is a single JSON array of flat records, rewritten wholesale
//! on every mutation. A missing or unparseable file is treated as an empty
//! store on read; the stores are small and single-process, so the simplicity
//! is acceptable.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use parlance_core::error::{ParlanceError, Result};

/// Read all records from a store file.
///
/// A missing file or one that fails to parse yields an empty Vec. Corruption
/// is logged at warn level and never propagated as an error.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                "Store file {} is corrupt ({}); treating as empty",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Rewrite a store file with the full record array.
///
/// Creates parent directories as needed. The file handle is scoped to this
/// function and released on every exit path.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(path, content)
        .map_err(|e| ParlanceError::Storage(format!("Failed to write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        value: i64,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: "a".to_string(),
                value: 1,
            },
            Row {
                id: "b".to_string(),
                value: 2,
            },
        ]
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");

        write_records(&path, &rows()).unwrap();
        let loaded: Vec<Row> = read_records(&path);
        assert_eq!(loaded, rows());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let loaded: Vec<Row> = read_records(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "[{\"id\": \"a\", \"val").unwrap();

        let loaded: Vec<Row> = read_records(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_recovery_allows_subsequent_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "not json").unwrap();

        let mut loaded: Vec<Row> = read_records(&path);
        assert!(loaded.is_empty());

        loaded.push(Row {
            id: "c".to_string(),
            value: 3,
        });
        write_records(&path, &loaded).unwrap();

        let reloaded: Vec<Row> = read_records(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id, "c");
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("rows.json");
        write_records(&path, &rows()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let empty: Vec<Row> = Vec::new();
        write_records(&path, &empty).unwrap();
        let loaded: Vec<Row> = read_records(&path);
        assert!(loaded.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }
}
