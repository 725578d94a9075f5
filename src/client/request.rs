//! Upstream request URL construction.
//!
//! Side-effect free so every endpoint shape is unit-testable. Identifiers
//! supplied by callers always land in their own percent-encoded path segment,
//! and optional query parameters are emitted only when a value was given.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::{ClientError, ClientResult};

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Entity kinds the upstream search endpoint understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchType {
    Markets,
    Events,
    Profiles,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markets => "markets",
            Self::Events => "events",
            Self::Profiles => "profiles",
        }
    }

    /// Parse a comma separated list, silently dropping unknown entries.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(|t| t.parse().ok()).collect()
    }
}

impl FromStr for SearchType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markets" => Ok(Self::Markets),
            "events" => Ok(Self::Events),
            "profiles" => Ok(Self::Profiles),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: Option<u32>,
    pub types: Vec<SearchType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub interval: Option<String>,
    pub limit: Option<u32>,
    pub from_ts: Option<String>,
    pub to_ts: Option<String>,
}

/// Endpoint URLs for one upstream origin.
#[derive(Clone, Debug)]
pub struct UpstreamUrls {
    base: Url,
    history_path: String,
}

impl UpstreamUrls {
    /// Validate and normalize the upstream base. Trailing slashes, query and
    /// fragment are discarded; a path prefix (e.g. `/v1`) is kept.
    pub fn parse(base: &str) -> ClientResult<Self> {
        let trimmed = base.trim().trim_end_matches('/');
        let mut url = Url::parse(trimmed)
            .map_err(|e| ClientError::Config(format!("invalid upstream base url {trimmed:?}: {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "upstream base url must be an absolute http(s) url, got {trimmed:?}"
            )));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self {
            base: url,
            history_path: "history".to_string(),
        })
    }

    pub fn with_history_path(mut self, path: &str) -> Self {
        let path = path.trim_matches('/');
        if !path.is_empty() {
            self.history_path = path.to_string();
        }
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `parse` rejected cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_query(mut url: Url, pairs: &[(&str, String)]) -> Url {
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    pub fn search(&self, query: &str, opts: &SearchOptions) -> Url {
        let mut pairs = vec![
            ("query", query.to_string()),
            ("limit", opts.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).to_string()),
        ];
        if !opts.types.is_empty() {
            let types: Vec<&str> = opts.types.iter().map(|t| t.as_str()).collect();
            pairs.push(("types", types.join(",")));
        }
        Self::with_query(self.endpoint(&["search"]), &pairs)
    }

    pub fn market_by_id(&self, id: &str) -> Url {
        self.endpoint(&["markets", id])
    }

    pub fn market_by_slug(&self, slug: &str) -> Url {
        self.endpoint(&["markets", "slug", slug])
    }

    pub fn last_price(&self, token_id: &str) -> Url {
        self.endpoint(&["prices", "last", token_id])
    }

    pub fn midpoint(&self, token_id: &str) -> Url {
        self.endpoint(&["prices", "midpoint", token_id])
    }

    pub fn book(&self, token_id: &str, depth: Option<u32>) -> Url {
        let pairs: Vec<(&str, String)> = depth.map(|d| ("depth", d.to_string())).into_iter().collect();
        Self::with_query(self.endpoint(&["books", token_id]), &pairs)
    }

    pub fn trades(&self, token_id: &str, limit: Option<u32>) -> Url {
        let pairs: Vec<(&str, String)> = limit.map(|l| ("limit", l.to_string())).into_iter().collect();
        Self::with_query(self.endpoint(&["trades", token_id]), &pairs)
    }

    pub fn price_history(&self, token_id: &str, q: &HistoryQuery) -> Url {
        let mut pairs = Vec::new();
        if let Some(interval) = &q.interval {
            pairs.push(("interval", interval.clone()));
        }
        if let Some(limit) = q.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(from) = &q.from_ts {
            pairs.push(("fromTs", from.clone()));
        }
        if let Some(to) = &q.to_ts {
            pairs.push(("toTs", to.clone()));
        }
        let mut segments: Vec<&str> = self.history_path.split('/').collect();
        segments.push(token_id);
        Self::with_query(self.endpoint(&segments), &pairs)
    }

    pub fn tags(&self) -> Url {
        self.endpoint(&["tags"])
    }
}
