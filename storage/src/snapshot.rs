//! Named snapshots stored as JSON and bincode side by side

use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Result, StorageError};

/// Snapshot directory
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open storage directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }
        Ok(Self { data_dir })
    }

    /// Save a snapshot (JSON for readability, bincode for speed)
    pub fn save_snapshot<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let (json_path, bin_path) = self.paths(name)?;

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let bin =
            bincode::serialize(data).map_err(|e| StorageError::SerializationError(e.to_string()))?;

        // Bincode is read first on load, so it must never lag the JSON copy.
        write_atomic(&bin_path, &bin)?;
        write_atomic(&json_path, json.as_bytes())?;

        debug!("saved snapshot {} ({} bytes bincode)", name, bin.len());
        Ok(())
    }

    /// Load a snapshot (bincode first, JSON as fallback)
    pub fn load_snapshot<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let (json_path, bin_path) = self.paths(name)?;

        if bin_path.exists() {
            let data = fs::read(&bin_path)?;
            return bincode::deserialize(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        if json_path.exists() {
            let data = fs::read_to_string(&json_path)?;
            return serde_json::from_str(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        Err(StorageError::SnapshotNotFound(name.to_string()))
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        match self.paths(name) {
            Ok((json_path, bin_path)) => json_path.exists() || bin_path.exists(),
            Err(_) => false,
        }
    }

    /// List snapshot names, sorted
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_snapshot = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("bin")
            );
            if !is_snapshot {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !snapshots.iter().any(|known| known == name) {
                    snapshots.push(name.to_string());
                }
            }
        }

        snapshots.sort();
        Ok(snapshots)
    }

    pub fn delete_snapshot(&self, name: &str) -> Result<()> {
        let (json_path, bin_path) = self.paths(name)?;
        if bin_path.exists() {
            fs::remove_file(bin_path)?;
        }
        if json_path.exists() {
            fs::remove_file(json_path)?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn paths(&self, name: &str) -> Result<(PathBuf, PathBuf)> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok((
            self.data_dir.join(format!("{}.json", name)),
            self.data_dir.join(format!("{}.bin", name)),
        ))
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        value: u128,
        name: String,
    }

    fn data(value: u128, name: &str) -> TestData {
        TestData {
            value,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let saved = data(u128::MAX >> 16, "test");
        storage.save_snapshot("test", &saved).unwrap();
        let loaded: TestData = storage.load_snapshot("test").unwrap();

        assert_eq!(saved, loaded);
    }

    #[test]
    fn test_json_fallback() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage.save_snapshot("test", &data(7, "seven")).unwrap();
        fs::remove_file(dir.path().join("test.bin")).unwrap();

        let loaded: TestData = storage.load_snapshot("test").unwrap();
        assert_eq!(loaded, data(7, "seven"));
    }

    #[test]
    fn test_failed_json_write_keeps_newest_bincode() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.save_snapshot("test", &data(1, "old")).unwrap();

        // A non-empty directory in place of the JSON file makes its write fail.
        let json_path = dir.path().join("test.json");
        fs::remove_file(&json_path).unwrap();
        fs::create_dir(&json_path).unwrap();
        fs::write(json_path.join("blocker"), b"x").unwrap();

        assert!(storage.save_snapshot("test", &data(2, "new")).is_err());
        let loaded: TestData = storage.load_snapshot("test").unwrap();
        assert_eq!(loaded, data(2, "new"));
    }

    #[test]
    fn test_has_and_delete_snapshot() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        assert!(!storage.has_snapshot("test"));
        storage.save_snapshot("test", &data(1, "one")).unwrap();
        assert!(storage.has_snapshot("test"));

        storage.delete_snapshot("test").unwrap();
        assert!(!storage.has_snapshot("test"));
        assert!(matches!(
            storage.load_snapshot::<TestData>("test"),
            Err(StorageError::SnapshotNotFound(_))
        ));
    }

    #[test]
    fn test_list_snapshots() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage.save_snapshot("snapshot2", &data(2, "two")).unwrap();
        storage.save_snapshot("snapshot1", &data(1, "one")).unwrap();

        assert_eq!(
            storage.list_snapshots().unwrap(),
            vec!["snapshot1".to_string(), "snapshot2".to_string()]
        );
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        assert!(matches!(
            storage.save_snapshot("../escape", &data(1, "x")),
            Err(StorageError::InvalidName(_))
        ));
        assert!(!storage.has_snapshot(""));
    }
}
