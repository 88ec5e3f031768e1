// Marketplace API module.
// Defines the remote service contract and its reqwest-backed implementation.

pub mod client;
pub mod endpoints;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::MarketClient;
pub use endpoints::GameMarket;
pub use types::*;

/// Remote operations the inventory manager depends on.
#[async_trait]
pub trait Market: Send + Sync {
    /// Fetch the full inventory for one game context.
    async fn fetch_inventory(&self, app_id: u32, context_id: u32) -> Result<Vec<RawItem>>;

    /// Search market listings.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>>;

    /// Purchase the given listings for a quoted total amount.
    async fn purchase(&self, listing_ids: &[ItemId], total_amount: u64) -> Result<Vec<PurchaseResult>>;

    /// Withdraw owned items to the account's external trade partner.
    async fn withdraw(&self, item_ids: &[ItemId]) -> Result<WithdrawResponse>;
}
