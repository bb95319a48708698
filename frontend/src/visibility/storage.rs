//! Durable key-value storage for user preferences.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;


pub trait PreferenceStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-memory storage; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Percent-encoded, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl PreferenceStorage for FileStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read preferences at {path:?}"))?;
        Ok(Some(raw))
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| format!("failed to create {:?}", self.dir))?;
        let path = self.path_for(key);
        std::fs::write(&path, value).with_context(|| format!("failed to write preferences at {path:?}"))?;
        Ok(())
    }
}

/// The browser's `localStorage`.
#[cfg(feature = "web")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(feature = "web")]
impl LocalStorage {
    fn storage() -> anyhow::Result<web_sys::Storage> {
        let window = web_sys::window().context("no window")?;
        window
            .local_storage()
            .map_err(|e| anyhow::anyhow!("localStorage unavailable: {:?}", e))?
            .context("localStorage disabled")
    }
}

#[cfg(feature = "web")]
impl PreferenceStorage for LocalStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Self::storage()?.get_item(key).map_err(|e| anyhow::anyhow!("failed to read {}: {:?}", key, e))
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        Self::storage()?.set_item(key, value).map_err(|e| anyhow::anyhow!("failed to write {}: {:?}", key, e))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_entries() {
        let mut storage = MemoryStorage::default();
        let other = storage.clone();
        storage.write("ns", "{}").unwrap();
        assert_eq!(other.read("ns").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_storage_round_trips_and_encodes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("prefs"));
        assert_eq!(storage.read("people/search").unwrap(), None);

        storage.write("people/search", "{\"a\":true}").unwrap();
        assert_eq!(storage.read("people/search").unwrap().as_deref(), Some("{\"a\":true}"));
        assert!(dir.path().join("prefs").join("people%2Fsearch.json").exists());
    }

    #[test]
    fn similar_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.write("people/search", "1").unwrap();
        storage.write("people_search", "2").unwrap();
        storage.write("people search", "3").unwrap();

        assert_eq!(storage.read("people/search").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.read("people_search").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.read("people search").unwrap().as_deref(), Some("3"));
    }
}
