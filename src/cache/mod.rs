// Cache module for the local inventory mirror.
// Persists owned items to disk so restarts do not need a full remote fetch.

pub mod inventory;
pub mod paths;
pub mod store;

pub use inventory::{AsItemId, Inventory};
pub use paths::{CacheKey, data_dir, inventory_path};
pub use store::InventoryStore;
