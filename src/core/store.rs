use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::TrackerError;

/// Package slugs key state files; an empty slug would persist under a
/// degenerate name like `history-.json`, so it is rejected before any
/// store touches disk.
pub fn ensure_package(package: &str) -> Result<(), TrackerError> {
    if package.trim().is_empty() {
        return Err(TrackerError::InvalidPackage("empty slug".to_string()));
    }
    Ok(())
}

/// One JSON file per concern under the data directory. There are no
/// cross-file transactions; readers tolerate absent or stale files by
/// falling back to the type's default, writers surface failures so the
/// caller decides whether to retry.
pub struct StateStore {
    data_dir: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Result<Self, TrackerError> {
        fs::create_dir_all(data_dir).map_err(|e| TrackerError::Storage(e.to_string()))?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Missing or unreadable state is "no prior state", never an error.
    pub fn read<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => T::default(),
        }
    }

    pub fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), TrackerError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.path(name), json).map_err(|e| TrackerError::Storage(e.to_string()))
    }

    pub fn remove(&self, name: &str) -> Result<(), TrackerError> {
        let path = self.path(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| TrackerError::Storage(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        let map: HashMap<String, u32> = store.read("nothing.json");
        assert!(map.is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        std::fs::write(store.path("bad.json"), b"{not json").unwrap();
        let map: HashMap<String, u32> = store.read("bad.json");
        assert!(map.is_empty());
    }

    #[test]
    fn empty_package_slug_is_rejected() {
        assert!(matches!(
            ensure_package(""),
            Err(crate::core::error::TrackerError::InvalidPackage(_))
        ));
        assert!(matches!(
            ensure_package("   "),
            Err(crate::core::error::TrackerError::InvalidPackage(_))
        ));
        assert!(ensure_package("plugin-a").is_ok());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        let mut map = HashMap::new();
        map.insert("a".to_string(), 1u32);
        store.write("map.json", &map).unwrap();
        let back: HashMap<String, u32> = store.read("map.json");
        assert_eq!(back, map);
    }
}
