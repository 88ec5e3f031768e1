// skinstash: local inventory mirror for a skin trading marketplace.
// Buys items by market name and withdraws owned items, keeping an on-disk cache in sync.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod market;

pub use config::Config;
pub use error::{Result, StashError};
pub use manager::{CacheSource, InventoryManager, SyncState};
pub use market::{Item, ItemId, Market, WithdrawSummary};
