// In-memory inventory cache.
// Ordered list of owned items; every mutation is mirrored to the inventory store.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::Result;
use crate::market::{Item, ItemId};

use super::store::InventoryStore;

/// Anything that identifies a cached item: a bare id or a record carrying one.
pub trait AsItemId {
    fn item_id(&self) -> &str;
}

impl AsItemId for str {
    fn item_id(&self) -> &str {
        self
    }
}

impl AsItemId for String {
    fn item_id(&self) -> &str {
        self
    }
}

impl AsItemId for ItemId {
    fn item_id(&self) -> &str {
        self.as_str()
    }
}

impl AsItemId for Item {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }
}

impl<T: AsItemId + ?Sized> AsItemId for &T {
    fn item_id(&self) -> &str {
        (**self).item_id()
    }
}

/// The owned items, in arrival order.
///
/// Ids are unique and non-empty. A mutation that fails to persist still applies in
/// memory; the error is returned so the caller can decide what to do.
#[derive(Debug)]
pub struct Inventory {
    items: Vec<Item>,
    store: InventoryStore,
}

impl Inventory {
    /// Create an empty inventory backed by `store`.
    pub fn new(store: InventoryStore) -> Self {
        Self {
            items: Vec::new(),
            store,
        }
    }

    /// Adopt previously persisted items without writing them back.
    pub fn with_items(store: InventoryStore, items: Vec<Item>) -> Self {
        let mut seen = HashSet::new();
        let total = items.len();
        let items: Vec<Item> = items
            .into_iter()
            .filter(|item| !item.id.is_empty() && seen.insert(item.id.clone()))
            .collect();

        if items.len() != total {
            warn!(
                path = %store.path().display(),
                dropped = total - items.len(),
                "persisted inventory had empty or duplicate ids"
            );
        }

        Self { items, store }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    /// First item with this market name, if any.
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Position of the item with this id.
    pub fn find_index_by_id(&self, id: impl AsItemId) -> Option<usize> {
        let id = id.item_id();
        self.items.iter().position(|item| item.id.as_str() == id)
    }

    pub fn contains(&self, id: impl AsItemId) -> bool {
        self.find_index_by_id(id).is_some()
    }

    /// Append `item` and persist, unless its id is empty or already cached.
    ///
    /// Returns whether the item was inserted.
    pub fn add_item(&mut self, item: Item) -> Result<bool> {
        if item.id.is_empty() || self.contains(&item) {
            debug!(id = %item.id, "skipping empty or duplicate item");
            return Ok(false);
        }

        debug!(id = %item.id, name = %item.name, "caching item");
        self.items.push(item);
        self.persist()?;
        Ok(true)
    }

    /// Remove the item with this id and persist. Missing ids are a no-op.
    pub fn remove_item(&mut self, id: impl AsItemId) -> Result<Option<Item>> {
        let Some(index) = self.find_index_by_id(&id) else {
            return Ok(None);
        };

        let removed = self.items.remove(index);
        debug!(id = %removed.id, name = %removed.name, "uncaching item");
        self.persist()?;
        Ok(Some(removed))
    }

    /// Put a record back at `index` in memory only, without saving.
    ///
    /// Used to undo a removal whose save failed, so memory matches the file again.
    /// Ignored if the id is already cached.
    pub fn restore_at(&mut self, index: usize, item: Item) {
        if item.id.is_empty() || self.contains(&item) {
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.items)
    }
}
