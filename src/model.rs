//! Canonical DTOs served to callers.
//!
//! Everything here is built fresh per request from upstream payloads and is
//! never mutated afterwards. Field names serialize in camelCase and absent
//! optional fields are omitted from the JSON output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

/// Lifecycle state of a market.
///
/// Upstream uses several spellings for the two states we care about; anything
/// else is carried through verbatim since new status strings may appear.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketStatus {
    Active,
    Closed,
    Other(String),
}

impl MarketStatus {
    /// Map a raw upstream status. Blank input means "no status".
    pub fn from_raw(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let status = match raw.to_ascii_lowercase().as_str() {
            "open" | "active" | "trading" => Self::Active,
            "closed" | "resolved" | "finalized" | "settled" | "ended" => Self::Closed,
            _ => Self::Other(raw.to_string()),
        };
        Some(status)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MarketStatus {
    fn from(raw: String) -> Self {
        Self::from_raw(&raw).unwrap_or(Self::Other(raw))
    }
}

impl From<MarketStatus> for String {
    fn from(status: MarketStatus) -> Self {
        match status {
            MarketStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A normalized market. `id`, `slug` and `title` are always non-empty.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    pub slug: String,
    pub title: String,
    /// ISO-8601 end time, passed through as given.
    pub end_time: Option<String>,
    pub status: Option<MarketStatus>,
    pub volume: Option<f64>,
    pub open_interest: Option<f64>,
    pub token_ids: Option<Vec<String>>,
}

/// Parsed market reference: lookup by id or by slug, never both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRef {
    Id(String),
    Slug(String),
}

/// One order book level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

/// Order book for a single outcome token. Level order is upstream's order.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSnapshot {
    pub token_id: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub ts: Option<Value>,
    pub seq: i64,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub token_id: String,
    pub side: Option<String>,
    pub price: f64,
    pub size: f64,
    pub ts: Option<Value>,
    pub trade_id: String,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub token_id: String,
    pub price: f64,
    pub ts: Option<Value>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidpointQuote {
    pub token_id: String,
    pub midpoint: f64,
    pub ts: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: String,
    pub price: f64,
}
