//! Request handlers: validate parameters, make at most one upstream call,
//! normalize the result, and wrap it as `{data: ...}`.

use axum::{
    extract::{FromRequestParts, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::client::{HistoryQuery, SearchOptions, SearchType};
use crate::model::{BookSnapshot, Market, MarketRef, MidpointQuote, PricePoint, PriceQuote, Trade};
use crate::normalize::{extract_market_ref, normalize_market_detail, normalize_search};

use super::error::ApiError;
use super::AppState;

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}

/// `Query` whose rejection is answered with the JSON error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Trimmed, non-empty value of a required parameter.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing(name))
}

/// Optional non-negative integer; blank counts as absent.
fn optional_u32(value: &Option<String>, name: &str) -> Result<Option<u32>, ApiError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<u32>().map(Some).map_err(|_| ApiError::invalid(name)),
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// GET /health
pub async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub types: Option<String>,
}

/// GET /api/search?q=&limit=&types=markets,events
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<ApiResponse<Vec<Market>>> {
    let q = required(&params.q, "q")?;
    let opts = SearchOptions {
        limit: optional_u32(&params.limit, "limit")?,
        types: params.types.as_deref().map(SearchType::parse_list).unwrap_or_default(),
    };

    let raw = state.source.search_markets(q, &opts).await?;
    Ok(ApiResponse::new(normalize_search(&raw)))
}

#[derive(Debug, Default, Deserialize)]
pub struct InputParams {
    pub input: Option<String>,
}

fn resolve_input(params: &InputParams) -> Result<MarketRef, ApiError> {
    let input = required(&params.input, "input")?;
    extract_market_ref(input).ok_or(ApiError::UnrecognizedInput)
}

/// GET /api/resolve?input= (also /api/market/resolve)
pub async fn resolve(ApiQuery(params): ApiQuery<InputParams>) -> ApiResult<MarketRef> {
    resolve_input(&params).map(Json)
}

/// GET /api/market?input=
pub async fn market(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<InputParams>,
) -> ApiResult<ApiResponse<Market>> {
    let market_ref = resolve_input(&params)?;
    let raw = match &market_ref {
        MarketRef::Id(id) => state.source.market_by_id(id).await?,
        MarketRef::Slug(slug) => state.source.market_by_slug(slug).await?,
    };

    let market = normalize_market_detail(&raw).ok_or_else(|| {
        let lookup = match &market_ref {
            MarketRef::Id(id) => format!("id {id}"),
            MarketRef::Slug(slug) => format!("slug {slug}"),
        };
        ApiError::NormalizeFailed(format!("market {lookup} is missing id, slug or title"))
    })?;
    Ok(ApiResponse::new(market))
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    #[serde(rename = "tokenId")]
    pub token_id: Option<String>,
}

/// GET /api/price?tokenId=
pub async fn price(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TokenParams>,
) -> ApiResult<ApiResponse<PriceQuote>> {
    let token_id = required(&params.token_id, "tokenId")?;
    let quote = state.source.last_price(token_id).await?;
    Ok(ApiResponse::new(quote))
}

/// GET /api/midpoint?tokenId=
pub async fn midpoint(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TokenParams>,
) -> ApiResult<ApiResponse<MidpointQuote>> {
    let token_id = required(&params.token_id, "tokenId")?;
    let quote = state.source.midpoint(token_id).await?;
    Ok(ApiResponse::new(quote))
}

#[derive(Debug, Default, Deserialize)]
pub struct BookParams {
    #[serde(rename = "tokenId")]
    pub token_id: Option<String>,
    pub depth: Option<String>,
}

/// GET /api/book?tokenId=&depth=
pub async fn book(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BookParams>,
) -> ApiResult<ApiResponse<BookSnapshot>> {
    let token_id = required(&params.token_id, "tokenId")?;
    let depth = optional_u32(&params.depth, "depth")?;
    let snapshot = state.source.book_snapshot(token_id, depth).await?;
    Ok(ApiResponse::new(snapshot))
}

#[derive(Debug, Default, Deserialize)]
pub struct TradesParams {
    #[serde(rename = "tokenId")]
    pub token_id: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/trades?tokenId=&limit=
pub async fn trades(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TradesParams>,
) -> ApiResult<ApiResponse<Vec<Trade>>> {
    let token_id = required(&params.token_id, "tokenId")?;
    let limit = optional_u32(&params.limit, "limit")?;
    let trades = state.source.recent_trades(token_id, limit).await?;
    Ok(ApiResponse::new(trades))
}

/// GET /api/tags
pub async fn tags(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<String>>> {
    let tags = state.source.list_tags().await?;
    Ok(ApiResponse::new(tags))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(rename = "tokenId")]
    pub token_id: Option<String>,
    pub interval: Option<String>,
    pub limit: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/history?tokenId=&interval=&limit=&from=&to=
pub async fn history(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> ApiResult<ApiResponse<Vec<PricePoint>>> {
    let token_id = required(&params.token_id, "tokenId")?;
    let query = HistoryQuery {
        interval: optional_text(&params.interval),
        limit: optional_u32(&params.limit, "limit")?,
        from_ts: optional_text(&params.from),
        to_ts: optional_text(&params.to),
    };
    let points = state.source.price_history(token_id, &query).await?;
    Ok(ApiResponse::new(points))
}

/// Fallback for unknown paths and non-GET methods.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
