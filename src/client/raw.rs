//! Loosely-typed upstream payloads.
//!
//! The upstream API is inconsistent about representation: numbers arrive as
//! JSON numbers or numeric strings, book levels as `[price, size]` pairs or
//! `{price, size}` records, tags as bare names or records. Each ambiguous
//! shape gets an explicit untagged union here plus a single coercion into the
//! canonical types in [`crate::model`].

use serde::Deserialize;
use serde_json::Value;

use crate::model::{BookSnapshot, MidpointQuote, PriceLevel, PricePoint, PriceQuote, Trade};

use super::{ClientError, ClientResult};

/// A scalar that may be a number or a string (or something unexpected).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl Loose {
    /// Finite numeric value; numeric strings are trimmed and parsed.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => n.as_f64()?,
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
            Self::Other(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Integer value, truncating fractional numbers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64().or_else(|| self.as_f64().map(|f| f.trunc() as i64)),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| self.as_f64().map(|f| f.trunc() as i64)),
            Self::Other(_) => None,
        }
    }

    /// String form: text as-is, numbers in their JSON spelling.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Other(_) => None,
        }
    }
}

fn f64_of(v: &Option<Loose>) -> Option<f64> {
    v.as_ref().and_then(Loose::as_f64)
}

fn text_of(v: &Option<Loose>) -> Option<String> {
    v.as_ref().and_then(Loose::as_text)
}

/// Token id list: a JSON array, or (Gamma style) a JSON-encoded array string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenIds {
    List(Vec<Loose>),
    Encoded(String),
}

impl TokenIds {
    pub fn into_vec(self) -> Option<Vec<String>> {
        match self {
            Self::List(items) => Some(items.iter().filter_map(Loose::as_text).collect()),
            Self::Encoded(s) => serde_json::from_str::<Vec<Loose>>(&s)
                .ok()
                .map(|items| items.iter().filter_map(Loose::as_text).collect()),
        }
    }
}

/// Market record as returned by search and market lookups.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMarket {
    pub id: Option<Loose>,
    pub slug: Option<Loose>,
    pub question: Option<Loose>,
    pub title: Option<Loose>,
    pub volume: Option<Loose>,
    #[serde(rename = "openInterest")]
    pub open_interest: Option<Loose>,
    #[serde(rename = "endDate")]
    pub end_date: Option<Loose>,
    pub status: Option<Loose>,
    #[serde(rename = "tokenIds")]
    pub token_ids: Option<TokenIds>,
    #[serde(rename = "clobTokenIds")]
    pub clob_token_ids: Option<TokenIds>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSearchResponse {
    pub markets: Option<Vec<RawMarket>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawQuote {
    #[serde(rename = "tokenId")]
    token_id: Option<Loose>,
    price: Option<Loose>,
    midpoint: Option<Loose>,
    mid: Option<Loose>,
    ts: Option<Value>,
}

impl RawQuote {
    pub fn into_price(self, requested: &str) -> ClientResult<PriceQuote> {
        let price = f64_of(&self.price)
            .ok_or_else(|| ClientError::Decode(format!("last price for {requested} is not numeric")))?;
        Ok(PriceQuote {
            token_id: text_of(&self.token_id).unwrap_or_else(|| requested.to_string()),
            price,
            ts: self.ts.filter(|v| !v.is_null()),
        })
    }

    pub fn into_midpoint(self, requested: &str) -> ClientResult<MidpointQuote> {
        let midpoint = f64_of(&self.midpoint)
            .or_else(|| f64_of(&self.mid))
            .ok_or_else(|| ClientError::Decode(format!("midpoint for {requested} is not numeric")))?;
        Ok(MidpointQuote {
            token_id: text_of(&self.token_id).unwrap_or_else(|| requested.to_string()),
            midpoint,
            ts: self.ts.filter(|v| !v.is_null()),
        })
    }
}

/// Book level as `[price, size]` or `{price, size}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLevel {
    Pair(Vec<Loose>),
    Keyed {
        #[serde(default)]
        price: Option<Loose>,
        #[serde(default)]
        size: Option<Loose>,
    },
    Other(Value),
}

impl RawLevel {
    pub fn to_level(&self) -> Option<PriceLevel> {
        let (price, size) = match self {
            Self::Pair(items) => (items.first()?.as_f64()?, items.get(1)?.as_f64()?),
            Self::Keyed { price, size } => (f64_of(price)?, f64_of(size)?),
            Self::Other(_) => return None,
        };
        Some(PriceLevel { price, size })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawBook {
    #[serde(rename = "tokenId")]
    token_id: Option<Loose>,
    asset_id: Option<Loose>,
    bids: Option<Vec<RawLevel>>,
    asks: Option<Vec<RawLevel>>,
    ts: Option<Value>,
    seq: Option<Loose>,
}

fn levels(raw: Option<Vec<RawLevel>>) -> Vec<PriceLevel> {
    raw.unwrap_or_default()
        .iter()
        .filter_map(RawLevel::to_level)
        .collect()
}

impl RawBook {
    pub fn into_snapshot(self, requested: &str) -> BookSnapshot {
        BookSnapshot {
            token_id: text_of(&self.token_id)
                .or_else(|| text_of(&self.asset_id))
                .unwrap_or_else(|| requested.to_string()),
            bids: levels(self.bids),
            asks: levels(self.asks),
            ts: self.ts.filter(|v| !v.is_null()),
            seq: self.seq.as_ref().and_then(Loose::as_i64).unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTrade {
    #[serde(rename = "tokenId")]
    token_id: Option<Loose>,
    side: Option<Loose>,
    price: Option<Loose>,
    size: Option<Loose>,
    ts: Option<Value>,
    #[serde(rename = "tradeId")]
    trade_id: Option<Loose>,
}

impl RawTrade {
    pub fn to_trade(&self, requested: &str) -> Option<Trade> {
        Some(Trade {
            token_id: text_of(&self.token_id).unwrap_or_else(|| requested.to_string()),
            side: text_of(&self.side),
            price: f64_of(&self.price)?,
            size: f64_of(&self.size)?,
            ts: self.ts.clone().filter(|v| !v.is_null()),
            trade_id: text_of(&self.trade_id).unwrap_or_default(),
        })
    }
}

/// Trade row, or a non-record element that is skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTradeEntry {
    Trade(RawTrade),
    Other(Value),
}

/// Recent trades: a bare array, or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTrades {
    List(Vec<RawTradeEntry>),
    Trades { trades: Vec<RawTradeEntry> },
    Data { data: Vec<RawTradeEntry> },
    Null(()),
}

impl RawTrades {
    pub fn into_trades(self, requested: &str) -> Vec<Trade> {
        let rows = match self {
            Self::List(rows) | Self::Trades { trades: rows } | Self::Data { data: rows } => rows,
            Self::Null(()) => Vec::new(),
        };
        rows.iter()
            .filter_map(|row| match row {
                RawTradeEntry::Trade(t) => t.to_trade(requested),
                RawTradeEntry::Other(_) => None,
            })
            .collect()
    }
}

/// Tag entry: a bare name or a record naming it via `name`, `tag` or `id`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTag {
    Name(String),
    Record {
        #[serde(default)]
        name: Option<Loose>,
        #[serde(default)]
        tag: Option<Loose>,
        #[serde(default)]
        id: Option<Loose>,
    },
    Other(Value),
}

impl RawTag {
    /// First present field wins, even when it is blank (blank names are dropped later).
    pub fn name(&self) -> Option<String> {
        match self {
            Self::Name(s) => Some(s.clone()),
            Self::Record { name, tag, id } => name.as_ref().or(tag.as_ref()).or(id.as_ref())?.as_text(),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    List(Vec<RawTag>),
    Wrapped { tags: Vec<RawTag> },
    Other(Value),
}

impl RawTags {
    pub fn into_names(self) -> Vec<String> {
        let entries = match self {
            Self::List(entries) | Self::Wrapped { tags: entries } => entries,
            Self::Other(_) => return Vec::new(),
        };
        entries
            .iter()
            .filter_map(RawTag::name)
            .filter(|n| !n.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPoint {
    ts: Option<Loose>,
    time: Option<Loose>,
    t: Option<Loose>,
    price: Option<Loose>,
    p: Option<Loose>,
}

impl RawPoint {
    pub fn to_point(&self) -> Option<PricePoint> {
        let ts = self
            .ts
            .as_ref()
            .or(self.time.as_ref())
            .or(self.t.as_ref())?
            .as_text()
            .filter(|s| !s.is_empty())?;
        let price = self.price.as_ref().or(self.p.as_ref())?.as_f64()?;
        Some(PricePoint { ts, price })
    }
}

/// Price history entry: one of the point shapes, or something unusable.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPointEntry {
    Point(RawPoint),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawHistory {
    List(Vec<RawPointEntry>),
    Wrapped { data: Vec<RawPointEntry> },
    Other(Value),
}

impl RawHistory {
    pub fn into_points(self) -> Vec<PricePoint> {
        let entries = match self {
            Self::List(entries) | Self::Wrapped { data: entries } => entries,
            Self::Other(_) => return Vec::new(),
        };
        entries
            .iter()
            .filter_map(|e| match e {
                RawPointEntry::Point(p) => p.to_point(),
                RawPointEntry::Other(_) => None,
            })
            .collect()
    }
}
