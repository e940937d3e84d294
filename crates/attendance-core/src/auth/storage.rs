use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Page storage file name in cache directory
const STORAGE_FILE: &str = "page_storage.json";

/// Flat string key/value storage persisted as JSON, with the same
/// `get_item`/`set_item`/`remove_item` shape as browser storage.
pub struct PageStorage {
    path: PathBuf,
}

impl PageStorage {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(STORAGE_FILE),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        let parsed: Result<BTreeMap<String, String>> = std::fs::read_to_string(&self.path)
            .context("Failed to read page storage")
            .and_then(|contents| {
                serde_json::from_str(&contents).context("Failed to parse page storage")
            });
        match parsed {
            Ok(items) => items,
            Err(e) => {
                debug!(error = %e, "Treating unreadable page storage as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents).context("Failed to write page storage")?;
        Ok(())
    }
}
