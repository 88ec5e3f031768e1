// Inventory store for reading and writing the persisted item list.
// One JSON array per cache key, replaced atomically on every save.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::market::Item;

use super::paths::{CacheKey, inventory_path};

/// Durable mirror of one inventory.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the given cache key under a data directory.
    pub fn for_key(data_dir: &Path, key: &CacheKey) -> Self {
        Self::new(inventory_path(data_dir, key))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the inventory file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted items.
    ///
    /// Returns `None` when there is no usable file: missing, unreadable, or not a
    /// valid item list. Callers treat all of these as a cold cache.
    pub fn read(&self) -> Option<Vec<Item>> {
        if !self.path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "inventory cache unreadable");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Item>>(&contents) {
            Ok(items) => Some(items),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "inventory cache is not a valid item list");
                None
            }
        }
    }

    /// Replace the persisted items.
    pub fn save(&self, items: &[Item]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(items)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        let written = file
            .write_all(json.as_bytes())
            .and_then(|()| file.sync_all());
        drop(file);
        if let Err(error) = written.and_then(|()| fs::rename(&temp_path, &self.path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(error.into());
        }

        debug!(path = %self.path.display(), count = items.len(), "inventory cache saved");
        Ok(())
    }
}
