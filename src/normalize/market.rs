use crate::client::raw::Loose;
use crate::client::{RawMarket, RawSearchResponse};
use crate::model::{Market, MarketStatus};

fn non_empty_text(v: &Option<Loose>) -> Option<String> {
    let text = v.as_ref()?.as_text()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Map a raw market record to a [`Market`].
///
/// Returns `None` unless id, slug and title are all non-empty. `question`
/// stands in for the title only when `title` is absent, not when it is blank. Unparseable numeric fields are dropped.
pub fn normalize_market(raw: &RawMarket) -> Option<Market> {
    let id = non_empty_text(&raw.id)?;
    let slug = non_empty_text(&raw.slug)?;
    let title = non_empty_text(if raw.title.is_some() { &raw.title } else { &raw.question })?;

    let status = raw
        .status
        .as_ref()
        .and_then(Loose::as_text)
        .and_then(|s| MarketStatus::from_raw(&s));

    let token_ids = raw
        .token_ids
        .clone()
        .or_else(|| raw.clob_token_ids.clone())
        .and_then(|ids| ids.into_vec());

    Some(Market {
        id,
        slug,
        title,
        end_time: raw.end_date.as_ref().and_then(Loose::as_text),
        status,
        volume: raw.volume.as_ref().and_then(Loose::as_f64),
        open_interest: raw.open_interest.as_ref().and_then(Loose::as_f64),
        token_ids,
    })
}

/// Best-effort projection of a search response: invalid records are skipped.
pub fn normalize_search(res: &RawSearchResponse) -> Vec<Market> {
    let raw = res.markets.as_deref().unwrap_or_default();
    let markets: Vec<Market> = raw.iter().filter_map(normalize_market).collect();
    if markets.len() < raw.len() {
        tracing::debug!(
            target: "api",
            dropped = raw.len() - markets.len(),
            kept = markets.len(),
            "search records failed normalization"
        );
    }
    markets
}

/// Single-record variant used by the detail lookup. Same mapping as
/// [`normalize_market`]; callers treat `None` as a malformed payload.
pub fn normalize_market_detail(raw: &RawMarket) -> Option<Market> {
    normalize_market(raw)
}
