use super::KeyValueStore;
use crate::error::{MerchError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const STORAGE_FILENAME: &str = "storage.json";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(STORAGE_FILENAME)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(MerchError::Io)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let data_file = self.path();
        if !data_file.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(data_file).map_err(MerchError::Io)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let map: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(MerchError::Serialization)?;
        Ok(map)
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(map).map_err(MerchError::Serialization)?;
        fs::write(self.path(), content).map_err(MerchError::Io)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)?;
        tracing::trace!(key, "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
            tracing::trace!(key, "removed value");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get("search").unwrap(), None);
    }

    #[test]
    fn writes_through_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        store.set("search", "rune axe").unwrap();
        store.set("tags", "rune,dragon").unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get("search").unwrap().as_deref(), Some("rune axe"));
        assert_eq!(reopened.get("tags").unwrap().as_deref(), Some("rune,dragon"));
    }

    #[test]
    fn remove_deletes_only_that_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        store.set("token", "abc").unwrap();
        store.set("search", "whip").unwrap();
        store.remove("token").unwrap();
        store.remove("never-set").unwrap();

        assert_eq!(store.get("token").unwrap(), None);
        assert_eq!(store.get("search").unwrap().as_deref(), Some("whip"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILENAME), "not json").unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.get("search"),
            Err(MerchError::Serialization(_))
        ));
    }
}
