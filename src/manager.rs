// Inventory manager.
// Warms the inventory cache at startup and runs buy/withdraw against the marketplace.

use std::path::PathBuf;
use std::slice;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::{AsItemId, Inventory, InventoryStore};
use crate::config::Config;
use crate::error::{Result, StashError};
use crate::market::{GameMarket, Item, ItemId, Market, MarketClient, SearchQuery, WithdrawSummary};

/// Startup synchronization progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
}

/// Where the cache contents came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Adopted from the persisted file; no remote call was made.
    Disk,
    /// Replayed from a full remote inventory fetch.
    Remote,
    /// The remote fetch failed and the cache started empty.
    RemoteFailed,
}

/// Owns the inventory cache for one account and game.
///
/// All operations share one lock, so at most one buy or withdraw (including its
/// remote calls) is in flight at a time.
pub struct InventoryManager<M = GameMarket> {
    config: Config,
    market: M,
    inventory: Mutex<Inventory>,
    state: SyncState,
    source: CacheSource,
}

impl InventoryManager<GameMarket> {
    /// Build the HTTP client from `config` and load the inventory.
    pub async fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let client = MarketClient::from_config(&config)?;
        let market = GameMarket::new(client, config.app_id);
        Self::new(config, market).await
    }
}

impl<M: Market> InventoryManager<M> {
    /// Validate `config` and warm the cache, from disk if possible.
    ///
    /// Only configuration errors fail construction. A failed remote fetch leaves the
    /// cache empty.
    pub async fn new(config: Config, market: M) -> Result<Self> {
        config.validate()?;
        let store = InventoryStore::new(config.inventory_path()?);

        let mut manager = Self {
            inventory: Mutex::new(Inventory::new(store.clone())),
            config,
            market,
            state: SyncState::Uninitialized,
            source: CacheSource::RemoteFailed,
        };
        manager.load(store).await;
        Ok(manager)
    }

    async fn load(&mut self, store: InventoryStore) {
        self.state = SyncState::Loading;
        let account = self.config.account_label();

        if let Some(items) = store.read() {
            info!(
                account,
                count = items.len(),
                path = %store.path().display(),
                "loaded inventory from disk"
            );
            *self.inventory.get_mut() = Inventory::with_items(store, items);
            self.source = CacheSource::Disk;
            self.state = SyncState::Ready;
            return;
        }

        let (app_id, context_id) = (self.config.app_id, self.config.context_id);
        match self.market.fetch_inventory(app_id, context_id).await {
            Ok(raw_items) => {
                let inventory = self.inventory.get_mut();
                let fetched = raw_items.len();
                for raw in raw_items {
                    let item = raw.into_item(app_id, context_id);
                    if let Err(error) = inventory.add_item(item) {
                        warn!(%error, "failed to persist fetched item");
                    }
                }
                info!(
                    account,
                    fetched,
                    cached = inventory.len(),
                    "fetched inventory from marketplace"
                );
                self.source = CacheSource::Remote;
            }
            Err(error) => {
                error!(account, %error, "inventory fetch failed, starting with an empty cache");
                self.source = CacheSource::RemoteFailed;
            }
        }
        self.state = SyncState::Ready;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn market(&self) -> &M {
        &self.market
    }

    /// Always `Ready` for a constructed manager; the earlier states only exist
    /// while `new` is running.
    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn cache_source(&self) -> CacheSource {
        self.source
    }

    /// Snapshot of the cached items in arrival order.
    pub async fn items(&self) -> Vec<Item> {
        self.inventory.lock().await.items().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.inventory.lock().await.len()
    }

    pub async fn find_by_name(&self, name: &str) -> Option<Item> {
        self.inventory.lock().await.find_by_name(name).cloned()
    }

    pub async fn cache_path(&self) -> PathBuf {
        self.inventory.lock().await.store().path().to_path_buf()
    }

    /// Make sure an item with this market name is owned, buying one if needed.
    ///
    /// An already-cached item is returned without contacting the marketplace.
    /// Otherwise the first listing whose name matches exactly is bought for its
    /// listed price. On any failure the cache is left as it was.
    pub async fn buy(&self, name: &str, max_price: Option<u64>) -> Result<Item> {
        let mut inventory = self.inventory.lock().await;

        if let Some(item) = inventory.find_by_name(name) {
            debug!(name, id = %item.id, "already own item, skipping purchase");
            return Ok(item.clone());
        }

        let query = SearchQuery {
            name: name.to_string(),
            app_id: self.config.app_id,
            context_id: self.config.context_id,
            max_price,
        };
        let listings = self.market.search(&query).await?;
        debug!(name, results = listings.len(), "market search returned");

        let listing = listings
            .into_iter()
            .find(|listing| listing.name == name)
            .ok_or_else(|| StashError::ItemNotFound(name.to_string()))?;

        let purchased = self
            .market
            .purchase(slice::from_ref(&listing.id), listing.price)
            .await?;
        let result = purchased.into_iter().next().ok_or_else(|| {
            StashError::Remote(format!("purchase of listing {} returned no items", listing.id))
        })?;

        let item = result.into_item(self.config.app_id, self.config.context_id);
        info!(name, id = %item.id, price = listing.price, "bought item");
        inventory.add_item(item.clone())?;
        Ok(item)
    }

    /// Withdraw an owned item to the account's external trade partner.
    ///
    /// The item leaves the cache before the remote call and is put back if the call
    /// fails, in which case the remote error is returned.
    pub async fn withdraw(&self, id: impl AsItemId) -> Result<WithdrawSummary> {
        let item_id = ItemId::from(id.item_id());
        let mut inventory = self.inventory.lock().await;

        let cached = inventory
            .find_index_by_id(&item_id)
            .map(|index| (index, inventory.items()[index].clone()));

        if let Err(error) = inventory.remove_item(&item_id) {
            // Nothing was sent and the file still holds the old list.
            if let Some((index, item)) = cached {
                inventory.restore_at(index, item);
            }
            return Err(error);
        }
        let removed = cached.map(|(_, item)| item);
        if removed.is_none() {
            warn!(id = %item_id, "withdrawing an item that is not in the cache");
        }

        let outcome = self
            .market
            .withdraw(slice::from_ref(&item_id))
            .await
            .and_then(|response| {
                response.offers.into_iter().next().ok_or_else(|| {
                    StashError::Remote(format!("withdrawal of {} created no trade offer", item_id))
                })
            });

        match outcome {
            Ok(offer) => {
                let summary =
                    WithdrawSummary::from_offer(offer, self.config.app_id, self.config.context_id);
                info!(
                    id = %item_id,
                    bot_id = %summary.bot_id,
                    tradeoffer_id = %summary.tradeoffer_id,
                    "withdrew item"
                );
                if let Some(tradeoffer_error) = &summary.tradeoffer_error {
                    warn!(id = %item_id, %tradeoffer_error, "trade offer reported an error");
                }
                Ok(summary)
            }
            Err(error) => {
                if let Some(item) = removed {
                    warn!(id = %item.id, %error, "withdrawal failed, restoring item");
                    if let Err(persist_error) = inventory.add_item(item) {
                        warn!(id = %item_id, error = %persist_error, "failed to persist restored item");
                    }
                }
                Err(error)
            }
        }
    }
}
