use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{BookSnapshot, MidpointQuote, PricePoint, PriceQuote, Trade};
use crate::types::UpstreamConfig;

pub mod http;
pub mod raw;
pub mod request;

pub use http::HttpUpstreamClient;
pub use raw::{RawMarket, RawSearchResponse};
pub use request::{HistoryQuery, SearchOptions, SearchType, UpstreamUrls};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("unexpected payload: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Every read the service can make against the prediction-market API.
///
/// Search and market lookups hand back raw records (normalization happens in
/// [`crate::normalize`]); the remaining operations return coerced DTOs.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn search_markets(&self, query: &str, opts: &SearchOptions) -> ClientResult<RawSearchResponse>;

    async fn market_by_id(&self, id: &str) -> ClientResult<RawMarket>;

    async fn market_by_slug(&self, slug: &str) -> ClientResult<RawMarket>;

    async fn last_price(&self, token_id: &str) -> ClientResult<PriceQuote>;

    async fn midpoint(&self, token_id: &str) -> ClientResult<MidpointQuote>;

    async fn book_snapshot(&self, token_id: &str, depth: Option<u32>) -> ClientResult<BookSnapshot>;

    async fn recent_trades(&self, token_id: &str, limit: Option<u32>) -> ClientResult<Vec<Trade>>;

    async fn list_tags(&self) -> ClientResult<Vec<String>>;

    async fn price_history(&self, token_id: &str, query: &HistoryQuery) -> ClientResult<Vec<PricePoint>>;
}

/// Stand-in used when no upstream base URL is configured. Never touches the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredSource;

impl UnconfiguredSource {
    fn error<T>() -> ClientResult<T> {
        Err(ClientError::Config(
            "upstream client not configured: set POLYMARKET_API_BASE".to_string(),
        ))
    }
}

#[async_trait]
impl MarketDataSource for UnconfiguredSource {
    async fn search_markets(&self, _query: &str, _opts: &SearchOptions) -> ClientResult<RawSearchResponse> {
        Self::error()
    }

    async fn market_by_id(&self, _id: &str) -> ClientResult<RawMarket> {
        Self::error()
    }

    async fn market_by_slug(&self, _slug: &str) -> ClientResult<RawMarket> {
        Self::error()
    }

    async fn last_price(&self, _token_id: &str) -> ClientResult<PriceQuote> {
        Self::error()
    }

    async fn midpoint(&self, _token_id: &str) -> ClientResult<MidpointQuote> {
        Self::error()
    }

    async fn book_snapshot(&self, _token_id: &str, _depth: Option<u32>) -> ClientResult<BookSnapshot> {
        Self::error()
    }

    async fn recent_trades(&self, _token_id: &str, _limit: Option<u32>) -> ClientResult<Vec<Trade>> {
        Self::error()
    }

    async fn list_tags(&self) -> ClientResult<Vec<String>> {
        Self::error()
    }

    async fn price_history(&self, _token_id: &str, _query: &HistoryQuery) -> ClientResult<Vec<PricePoint>> {
        Self::error()
    }
}

/// Pick the data source for the configured upstream.
pub fn build_source(cfg: &UpstreamConfig) -> ClientResult<Arc<dyn MarketDataSource>> {
    match cfg.base_url.as_deref() {
        Some(_) => Ok(Arc::new(HttpUpstreamClient::new(cfg)?)),
        None => {
            tracing::warn!(target: "upstream", "no upstream base configured; every call will fail");
            Ok(Arc::new(UnconfiguredSource))
        }
    }
}
