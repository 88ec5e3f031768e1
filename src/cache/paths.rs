// Cache path utilities.
// Resolves the application data directory and derives per-account inventory file names.

use std::fmt;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

/// Hex chars of the hashed API key kept in the cache key.
const KEY_HASH_LEN: usize = 16;

/// Get the base data directory (~/.local/share/skinstash on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "skinstash").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Identifies one persisted inventory: an account on one game context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(api_key: &str, app_id: u32, context_id: u32) -> Self {
        let digest = sha256_hex(api_key);
        Self(format!(
            "{}_{}_{}",
            &digest[..KEY_HASH_LEN],
            app_id,
            context_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to the inventories directory.
pub fn inventories_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("inventories")
}

/// Path to the inventory file for a cache key.
pub fn inventory_path(data_dir: &Path, key: &CacheKey) -> PathBuf {
    inventories_dir(data_dir).join(format!("inventory_{}.json", sanitize_name(key.as_str())))
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
