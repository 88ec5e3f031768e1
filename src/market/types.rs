// Marketplace types.
// The canonical cached Item record plus the wire types of the marketplace REST API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Platform-assigned item identifier.
///
/// The marketplace is inconsistent about sending ids as JSON strings or numbers;
/// both decode to the same value and the id is always written back as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(ItemId)
    }
}

/// Accept either a JSON string or an integer and produce a string.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Unsigned(n) => n.to_string(),
        StringOrNumber::Signed(n) => n.to_string(),
    })
}

/// An owned item as held in the local inventory cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Market hash name. Several owned items may share one.
    pub name: String,
    pub appid: u32,
    pub contextid: u32,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, appid: u32, contextid: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            appid,
            contextid,
        }
    }
}

/// Inventory entry as returned by the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub id: ItemId,
    #[serde(alias = "market_hash_name")]
    pub name: String,
    #[serde(default, alias = "app_id")]
    pub appid: Option<u32>,
    #[serde(default, alias = "context_id")]
    pub contextid: Option<u32>,
}

impl RawItem {
    /// Normalize into a cache record, filling missing game fields from the configured game.
    pub fn into_item(self, app_id: u32, context_id: u32) -> Item {
        Item {
            id: self.id,
            name: self.name,
            appid: self.appid.unwrap_or(app_id),
            contextid: self.contextid.unwrap_or(context_id),
        }
    }
}

/// A marketplace listing, not yet owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ItemId,
    #[serde(alias = "market_hash_name")]
    pub name: String,
    /// Price in the platform's minor currency units.
    pub price: u64,
}

/// Search parameters for the market listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    #[serde(rename = "market_hash_name")]
    pub name: String,
    pub app_id: u32,
    pub context_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
}

/// One purchased item as reported by the buy endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub id: ItemId,
    #[serde(alias = "market_hash_name")]
    pub name: String,
    #[serde(default, alias = "app_id")]
    pub appid: Option<u32>,
    #[serde(default, alias = "context_id")]
    pub contextid: Option<u32>,
    #[serde(default)]
    pub price: Option<u64>,
}

impl PurchaseResult {
    pub fn into_item(self, app_id: u32, context_id: u32) -> Item {
        Item {
            id: self.id,
            name: self.name,
            appid: self.appid.unwrap_or(app_id),
            contextid: self.contextid.unwrap_or(context_id),
        }
    }
}

/// Trade offer created by a withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(deserialize_with = "string_or_number")]
    pub bot_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub tradeoffer_id: String,
    #[serde(default)]
    pub tradeoffer_error: Option<String>,
}

/// Response body of the withdraw endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WithdrawResponse {
    #[serde(default)]
    pub offers: Vec<Offer>,
}

/// Outcome of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawSummary {
    pub items: Vec<Item>,
    pub bot_id: String,
    pub tradeoffer_id: String,
    pub tradeoffer_error: Option<String>,
}

impl WithdrawSummary {
    pub fn from_offer(offer: Offer, app_id: u32, context_id: u32) -> Self {
        Self {
            items: offer
                .items
                .into_iter()
                .map(|raw| raw.into_item(app_id, context_id))
                .collect(),
            bot_id: offer.bot_id,
            tradeoffer_id: offer.tradeoffer_id,
            tradeoffer_error: offer.tradeoffer_error,
        }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
