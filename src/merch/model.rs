use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item of the marketplace catalog.
///
/// This is the one shape used for every endpoint: the optional fields are
/// only present on the endpoints that embed them (`price_log` on searches
/// with prices and on detail pages, `favorited` when a token was sent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "id")]
    pub item_id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: bool,
    #[serde(default)]
    pub store_price: Option<i64>,
    #[serde(default)]
    pub buy_limit: Option<i64>,
    #[serde(default)]
    pub high_alch: Option<i64>,
    #[serde(default)]
    pub low_alch: Option<i64>,
    #[serde(default, alias = "price")]
    pub price_log: Option<PriceLog>,
    #[serde(default)]
    pub favorited: Option<bool>,
}

impl Item {
    pub fn new(item_id: u32, name: impl Into<String>) -> Self {
        Self {
            item_id,
            name: name.into(),
            description: String::new(),
            members: false,
            store_price: None,
            buy_limit: None,
            high_alch: None,
            low_alch: None,
            price_log: None,
            favorited: None,
        }
    }

    /// Case-insensitive substring match on the item name.
    pub fn name_matches(&self, fragment: &str) -> bool {
        self.name.to_lowercase().contains(&fragment.to_lowercase())
    }
}

/// The item a price log belongs to: either just its id, or the embedded
/// item on the latest-prices endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceLogItem {
    Id(u32),
    Item(Box<Item>),
}

impl PriceLogItem {
    pub fn item_id(&self) -> u32 {
        match self {
            PriceLogItem::Id(id) => *id,
            PriceLogItem::Item(item) => item.item_id,
        }
    }
}

/// A single price observation for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLog {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub item: Option<PriceLogItem>,
    #[serde(default)]
    pub buy_price: Option<i64>,
    #[serde(default)]
    pub sell_price: Option<i64>,
    #[serde(default)]
    pub average_price: Option<i64>,
    #[serde(default)]
    pub buy_volume: Option<i64>,
    #[serde(default)]
    pub sell_volume: Option<i64>,
}

impl PriceLog {
    /// Buying at 4 and selling at 5 is a profit of 1.
    pub fn profit(&self) -> Option<i64> {
        Some(self.sell_price? - self.buy_price?)
    }

    /// Buying at 4 and selling at 5 is a return of 1.25.
    pub fn roi(&self) -> Option<f64> {
        ratio(self.sell_price?, self.buy_price?)
    }

    /// A buy volume of 2000 against a sell volume of 10 is a demand of 200.
    pub fn demand(&self) -> Option<f64> {
        ratio(self.buy_volume?, self.sell_volume?)
    }
}

fn ratio(numerator: i64, denominator: i64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// The account an api token is registered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() => Some(format!("{} {}", first, last)),
            (Some(first), _) if !first.is_empty() => Some(first.to_string()),
            _ => None,
        }
    }
}
