// Marketplace endpoint functions.
// Typed wrappers over the inventory, search, buy, and withdraw REST endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::Market;
use super::client::MarketClient;
use super::types::{ItemId, Listing, PurchaseResult, RawItem, SearchQuery, WithdrawResponse};

/// Response wrapper for item lists.
#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Serialize)]
struct BuyRequest<'a> {
    app_id: u32,
    item_ids: &'a [ItemId],
    total_amount: u64,
}

#[derive(Debug, Serialize)]
struct WithdrawRequest<'a> {
    app_id: u32,
    item_ids: &'a [ItemId],
}

impl MarketClient {
    /// Get every item the account owns for one game context.
    pub async fn get_inventory(&self, app_id: u32, context_id: u32) -> Result<Vec<RawItem>> {
        let params = [
            ("app_id", app_id.to_string()),
            ("context_id", context_id.to_string()),
        ];
        let response = self.get_with_params("/inventory", &params).await?;
        let wrapper: ItemsResponse<RawItem> = response.json().await?;
        Ok(wrapper.items)
    }

    /// Search market listings.
    pub async fn search_listings(&self, query: &SearchQuery) -> Result<Vec<Listing>> {
        let response = self.get_with_params("/market/search", query).await?;
        let wrapper: ItemsResponse<Listing> = response.json().await?;
        Ok(wrapper.items)
    }

    /// Buy the given listings for a quoted total.
    pub async fn buy(
        &self,
        app_id: u32,
        listing_ids: &[ItemId],
        total_amount: u64,
    ) -> Result<Vec<PurchaseResult>> {
        let body = BuyRequest {
            app_id,
            item_ids: listing_ids,
            total_amount,
        };
        let response = self.post("/market/buy", &body).await?;
        let wrapper: ItemsResponse<PurchaseResult> = response.json().await?;
        Ok(wrapper.items)
    }

    /// Send owned items out to the account's external trade partner.
    pub async fn withdraw_items(&self, app_id: u32, item_ids: &[ItemId]) -> Result<WithdrawResponse> {
        let body = WithdrawRequest { app_id, item_ids };
        let response = self.post("/inventory/withdraw", &body).await?;
        let withdrawn: WithdrawResponse = response.json().await?;
        Ok(withdrawn)
    }
}

/// A client bound to one game, as the manager talks to it.
pub struct GameMarket {
    client: MarketClient,
    app_id: u32,
}

impl GameMarket {
    pub fn new(client: MarketClient, app_id: u32) -> Self {
        Self { client, app_id }
    }
}

#[async_trait]
impl Market for GameMarket {
    async fn fetch_inventory(&self, app_id: u32, context_id: u32) -> Result<Vec<RawItem>> {
        self.client.get_inventory(app_id, context_id).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Listing>> {
        self.client.search_listings(query).await
    }

    async fn purchase(&self, listing_ids: &[ItemId], total_amount: u64) -> Result<Vec<PurchaseResult>> {
        self.client.buy(self.app_id, listing_ids, total_amount).await
    }

    async fn withdraw(&self, item_ids: &[ItemId]) -> Result<WithdrawResponse> {
        self.client.withdraw_items(self.app_id, item_ids).await
    }
}
