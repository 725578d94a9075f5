use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::model::{BookSnapshot, MidpointQuote, PricePoint, PriceQuote, Trade};
use crate::monitoring::metrics::METRICS;
use crate::types::UpstreamConfig;

use super::raw::{RawBook, RawHistory, RawMarket, RawQuote, RawSearchResponse, RawTags, RawTrades};
use super::request::{HistoryQuery, SearchOptions, UpstreamUrls};
use super::{ClientError, ClientResult, MarketDataSource};

/// Longest slice of an error body carried into `ClientError::HttpStatus`.
const MAX_ERROR_BODY: usize = 512;

/// Upstream client issuing one JSON GET per operation. No retries: a failed
/// call is reported to the caller as-is.
pub struct HttpUpstreamClient {
    http: Client,
    urls: UpstreamUrls,
}

impl HttpUpstreamClient {
    pub fn new(config: &UpstreamConfig) -> ClientResult<Self> {
        let base = config
            .base_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("upstream base_url must be configured".to_string()))?;
        let urls = UpstreamUrls::parse(base)?.with_history_path(&config.history_path);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { http, urls })
    }

    pub fn urls(&self) -> &UpstreamUrls {
        &self.urls
    }

    /// GET `url`, decode it as `T` and convert it with `convert`. Decode and
    /// conversion failures are recorded as failed calls like transport errors.
    async fn get_json<T, R, F>(&self, operation: &'static str, url: Url, convert: F) -> ClientResult<R>
    where
        T: DeserializeOwned + Send,
        F: FnOnce(T) -> ClientResult<R> + Send,
    {
        let started = Instant::now();
        let result = self.fetch::<T>(url.clone()).await.and_then(convert);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                METRICS.record_upstream_ok(operation);
                tracing::debug!(target: "upstream", operation, url = %url, elapsed_ms, "upstream call ok");
            }
            Err(err) => {
                METRICS.record_upstream_failed(operation, &err.to_string());
                tracing::warn!(
                    target: "upstream",
                    operation,
                    url = %url,
                    elapsed_ms,
                    error = %err,
                    "upstream call failed"
                );
            }
        }
        result
    }

    async fn fetch<T>(&self, url: Url) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let resp = self.http.get(url).send().await?;
        if resp.status().is_success() {
            let bytes = resp.bytes().await?;
            let parsed = serde_json::from_slice::<T>(&bytes)?;
            Ok(parsed)
        } else {
            let status = resp.status();
            let mut body = resp.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            Err(ClientError::HttpStatus { status, body })
        }
    }
}

#[async_trait]
impl MarketDataSource for HttpUpstreamClient {
    async fn search_markets(&self, query: &str, opts: &SearchOptions) -> ClientResult<RawSearchResponse> {
        self.get_json("search", self.urls.search(query, opts), Ok).await
    }

    async fn market_by_id(&self, id: &str) -> ClientResult<RawMarket> {
        self.get_json("market_by_id", self.urls.market_by_id(id), Ok).await
    }

    async fn market_by_slug(&self, slug: &str) -> ClientResult<RawMarket> {
        self.get_json("market_by_slug", self.urls.market_by_slug(slug), Ok).await
    }

    async fn last_price(&self, token_id: &str) -> ClientResult<PriceQuote> {
        self.get_json("last_price", self.urls.last_price(token_id), |raw: RawQuote| {
            raw.into_price(token_id)
        })
        .await
    }

    async fn midpoint(&self, token_id: &str) -> ClientResult<MidpointQuote> {
        self.get_json("midpoint", self.urls.midpoint(token_id), |raw: RawQuote| {
            raw.into_midpoint(token_id)
        })
        .await
    }

    async fn book_snapshot(&self, token_id: &str, depth: Option<u32>) -> ClientResult<BookSnapshot> {
        self.get_json("book", self.urls.book(token_id, depth), |raw: RawBook| {
            Ok(raw.into_snapshot(token_id))
        })
        .await
    }

    async fn recent_trades(&self, token_id: &str, limit: Option<u32>) -> ClientResult<Vec<Trade>> {
        self.get_json("trades", self.urls.trades(token_id, limit), |raw: RawTrades| {
            Ok(raw.into_trades(token_id))
        })
        .await
    }

    async fn list_tags(&self) -> ClientResult<Vec<String>> {
        self.get_json("tags", self.urls.tags(), |raw: RawTags| Ok(raw.into_names()))
            .await
    }

    async fn price_history(&self, token_id: &str, query: &HistoryQuery) -> ClientResult<Vec<PricePoint>> {
        self.get_json("history", self.urls.price_history(token_id, query), |raw: RawHistory| {
            Ok(raw.into_points())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_base_url() {
        let err = HttpUpstreamClient::new(&UpstreamConfig::default()).err();
        assert!(matches!(err, Some(ClientError::Config(_))));
    }

    #[test]
    fn new_applies_history_path() {
        let cfg = UpstreamConfig {
            base_url: Some("https://api.pm/".to_string()),
            history_path: "prices-history".to_string(),
            ..UpstreamConfig::default()
        };
        let client = HttpUpstreamClient::new(&cfg).unwrap();
        let url = client.urls().price_history("tok", &HistoryQuery::default());
        assert_eq!(url.as_str(), "https://api.pm/prices-history/tok");
    }
}
