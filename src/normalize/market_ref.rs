use url::Url;

use crate::model::MarketRef;

/// Query parameters that carry an explicit id, highest priority first.
const ID_PARAMS: [&str; 4] = ["tokenId", "token_id", "marketId", "id"];

/// Minimum length for a bare hex string to count as an id.
const MIN_HEX_ID_LEN: usize = 8;

fn is_likely_id(s: &str) -> bool {
    let digits = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let hex = s.len() >= MIN_HEX_ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit());
    digits || hex
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`, case-insensitive.
fn is_likely_slug(s: &str) -> bool {
    !s.is_empty()
        && s
            .split('-')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric()))
}

fn classify(candidate: &str) -> Option<MarketRef> {
    if is_likely_id(candidate) {
        Some(MarketRef::Id(candidate.to_string()))
    } else if is_likely_slug(candidate) {
        Some(MarketRef::Slug(candidate.to_string()))
    } else {
        None
    }
}

fn from_url(url: &Url) -> Option<MarketRef> {
    for key in ID_PARAMS {
        let value = url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v);
        if let Some(value) = value {
            let value = value.trim();
            if !value.is_empty() {
                return Some(MarketRef::Id(value.to_string()));
            }
        }
    }

    let last = url.path().split('/').filter(|s| !s.is_empty()).last()?;
    classify(last)
}

/// Parse a market URL, slug or id into a [`MarketRef`].
///
/// Absolute URLs are inspected for an explicit id query parameter first, then
/// their last path segment is classified. Anything else is classified as a
/// whole. Ids win over slugs when a string could be either.
pub fn extract_market_ref(input: &str) -> Option<MarketRef> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(url) => from_url(&url),
        Err(_) => classify(raw),
    }
}
