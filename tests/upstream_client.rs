use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Request, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use marketlens::client::{ClientError, HttpUpstreamClient, MarketDataSource};
use marketlens::model::PriceLevel;
use marketlens::server::{create_router, AppState};
use marketlens::types::UpstreamConfig;

/// Requests seen by the stub: (path and query, accept header).
type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

fn record(seen: &Seen, uri: &Uri, headers: &HeaderMap) {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push((uri.to_string(), accept));
}

async fn search(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({"markets": [
        {"id": "1", "slug": "rain", "question": "Will it rain?", "volume": "5", "status": "Trading"},
        {"slug": "no-id", "question": "Dropped?"}
    ]}))
}

async fn market_by_slug(
    State(seen): State<Seen>,
    Path(slug): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({"id": 77, "slug": slug, "title": "Rain?", "clobTokenIds": "[\"y\",\"n\"]"}))
}

async fn market_by_id(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({"id": "123", "title": "No slug here"}))
}

async fn last_price(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({"price": "0.61", "ts": "2025-01-01T00:00:00Z"}))
}

async fn midpoint(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    record(&seen, &uri, &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn book(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({
        "bids": [["0.40", "100"], {"price": 0.39, "size": "50"}],
        "asks": [{"price": "0.42", "size": 7}],
        "seq": "12"
    }))
}

async fn trades(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!([
        {"side": "buy", "price": "0.5", "size": "3", "tradeId": "t-1"},
        {"tokenId": "other", "side": "sell", "price": 0.49, "size": 1}
    ]))
}

async fn tags(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({"tags": [{"name": "politics"}, {"tag": "crypto"}, {"id": 9}, {"name": ""}]}))
}

async fn history(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    record(&seen, &uri, &headers);
    Json(json!({"data": [
        {"t": 1700000000, "p": "0.5"},
        {"time": "1700003600", "price": 0.55},
        {"ts": "", "price": 0.6}
    ]}))
}

async fn garbage(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    record(&seen, &uri, &headers);
    "this is not json"
}

async fn spawn_upstream() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/search", get(search))
        .route("/markets/slug/:slug", get(market_by_slug))
        .route("/markets/:id", get(market_by_id))
        .route("/prices/last/:token", get(last_price))
        .route("/prices/midpoint/:token", get(midpoint))
        .route("/books/:token", get(book))
        .route("/trades/:token", get(trades))
        .route("/tags", get(tags))
        .route("/history/:token", get(history))
        .route("/garbage/:token", get(garbage))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), seen)
}

fn client_for(base: &str) -> HttpUpstreamClient {
    HttpUpstreamClient::new(&UpstreamConfig {
        base_url: Some(base.to_string()),
        timeout_secs: 5,
        ..UpstreamConfig::default()
    })
    .unwrap()
}

async fn call_api(client: HttpUpstreamClient, uri: &str) -> (StatusCode, Value) {
    let app = create_router(AppState::new(Arc::new(client)));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn search_end_to_end_coerces_volume() {
    let (base, seen) = spawn_upstream().await;
    let (status, body) = call_api(client_for(&base), "/api/search?q=rain").await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["volume"], json!(5.0));
    assert!(data[0]["volume"].is_number());
    assert_eq!(data[0]["status"], "active");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (uri, accept) = &seen[0];
    assert!(uri.starts_with("/search?"));
    assert!(uri.contains("query=rain"));
    assert!(uri.contains("limit=20"));
    assert_eq!(accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn market_detail_by_slug_end_to_end() {
    let (base, seen) = spawn_upstream().await;
    let (status, body) = call_api(client_for(&base), "/api/market?input=will-it-rain").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": {"id": "77", "slug": "will-it-rain", "title": "Rain?", "tokenIds": ["y", "n"]}})
    );
    assert_eq!(seen.lock().unwrap()[0].0, "/markets/slug/will-it-rain");
}

#[tokio::test]
async fn market_detail_normalize_failure() {
    let (base, _) = spawn_upstream().await;
    let (status, body) = call_api(client_for(&base), "/api/market?input=123").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "normalize_failed");
}

#[tokio::test]
async fn non_2xx_is_upstream_error() {
    let (base, _) = spawn_upstream().await;
    let (status, body) = call_api(client_for(&base), "/api/midpoint?tokenId=tok").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
    assert!(body["detail"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn book_levels_coerced_in_order() {
    let (base, seen) = spawn_upstream().await;
    let book = client_for(&base).book_snapshot("tok", Some(2)).await.unwrap();
    assert_eq!(book.token_id, "tok");
    assert_eq!(
        book.bids,
        vec![
            PriceLevel { price: 0.4, size: 100.0 },
            PriceLevel { price: 0.39, size: 50.0 },
        ]
    );
    assert_eq!(book.asks, vec![PriceLevel { price: 0.42, size: 7.0 }]);
    assert_eq!(book.seq, 12);
    assert_eq!(seen.lock().unwrap()[0].0, "/books/tok?depth=2");
}

#[tokio::test]
async fn price_trades_tags_history_end_to_end() {
    let (base, seen) = spawn_upstream().await;
    let client = client_for(&base);

    let quote = client.last_price("tok").await.unwrap();
    assert_eq!(quote.token_id, "tok");
    assert_eq!(quote.price, 0.61);

    let trades = client.recent_trades("tok", None).await.unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].token_id, "tok");
    assert_eq!(trades[0].trade_id, "t-1");
    assert_eq!(trades[0].size, 3.0);
    assert_eq!(trades[1].token_id, "other");
    assert_eq!(trades[1].trade_id, "");

    let tags = client.list_tags().await.unwrap();
    assert_eq!(tags, vec!["politics", "crypto", "9"]);

    let (status, body) = call_api(client, "/api/history?tokenId=tok&interval=1h&from=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [
            {"ts": "1700000000", "price": 0.5},
            {"ts": "1700003600", "price": 0.55}
        ]})
    );

    let seen = seen.lock().unwrap();
    let history_uri = &seen.last().unwrap().0;
    assert!(history_uri.starts_with("/history/tok?"));
    assert!(history_uri.contains("interval=1h"));
    assert!(history_uri.contains("fromTs=1"));
    assert!(!history_uri.contains("limit"));
    assert!(seen.iter().any(|(uri, _)| uri == "/trades/tok"));
}

#[tokio::test]
async fn invalid_json_is_reported() {
    let (base, _) = spawn_upstream().await;
    let client = HttpUpstreamClient::new(&UpstreamConfig {
        base_url: Some(base),
        history_path: "garbage".to_string(),
        ..UpstreamConfig::default()
    })
    .unwrap();
    let err = client
        .price_history("tok", &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SerdeJson(_)));
}

#[tokio::test]
async fn unreachable_upstream_is_502() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (status, body) = call_api(client_for(&format!("http://{addr}")), "/api/tags").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
    assert!(body["detail"].is_string());
}
