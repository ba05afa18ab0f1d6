//! Reading and writing the JSON key file.
//!
//! The file holds the complete record collection. Every flush is a full
//! overwrite through a same-directory temp file, so a crash mid-write
//! cannot leave a half-written key file behind.

use crate::constants;
use crate::error::{Result, StoreError};
use crate::models::record::Record;
use std::fs;
use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Read the full record collection from `path`.
///
/// A missing file and an undecodable file are distinct errors, so
/// callers can tell "no store yet" apart from "corrupt store".
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::KeyfileMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(StoreError::Io {
                context: "read key file",
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    serde_json::from_str(&content).map_err(|e| StoreError::KeyfileMalformed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Overwrite the key file at `path` with the given records.
pub fn write_records(path: &Path, records: &[&Record]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).map_err(StoreError::Encode)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::Io {
        context: "create temp key file in",
        path: dir.to_path_buf(),
        source: e,
    })?;
    tmp.write_all(json.as_bytes()).map_err(|e| StoreError::Io {
        context: "write temp key file in",
        path: dir.to_path_buf(),
        source: e,
    })?;
    tmp.flush().ok();

    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::KEY_FILE_MODE);
        tmp.as_file()
            .set_permissions(perm)
            .map_err(|e| StoreError::Io {
                context: "set permissions on temp key file in",
                path: dir.to_path_buf(),
                source: e,
            })?;
    }

    tmp.persist(path).map_err(|e| StoreError::Io {
        context: "persist key file",
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(account: &str, domain: &str, key: &str) -> Record {
        let mut record = Record::new();
        record.account = account.into();
        record.domain = domain.into();
        record.key = key.into();
        record
    }

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access_keys.json");
        let records = vec![
            sample_record("alice", "api.example.com", "s1"),
            sample_record("bob", "svc.io", "s2"),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        write_records(&path, &refs).unwrap();
        let loaded = read_records(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_missing_file_is_distinguishable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access_keys.json");
        match read_records(&path) {
            Err(StoreError::KeyfileMissing { .. }) => {}
            other => panic!("expected KeyfileMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_file_is_distinguishable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access_keys.json");
        fs::write(&path, "not json at all").unwrap();
        match read_records(&path) {
            Err(StoreError::KeyfileMalformed { .. }) => {}
            other => panic!("expected KeyfileMalformed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_write_overwrites_completely() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access_keys.json");
        let first = vec![sample_record("alice", "a.io", "s1")];
        let refs: Vec<&Record> = first.iter().collect();
        write_records(&path, &refs).unwrap();
        let second = vec![sample_record("bob", "b.io", "s2")];
        let refs: Vec<&Record> = second.iter().collect();
        write_records(&path, &refs).unwrap();
        let loaded = read_records(&path).unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("access_keys.json");
        let records = vec![sample_record("alice", "a.io", "s1")];
        let refs: Vec<&Record> = records.iter().collect();
        match write_records(&path, &refs) {
            Err(StoreError::Io { .. }) => {}
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_private() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access_keys.json");
        let records = vec![sample_record("alice", "a.io", "s1")];
        let refs: Vec<&Record> = records.iter().collect();
        write_records(&path, &refs).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, constants::KEY_FILE_MODE);
    }
}
