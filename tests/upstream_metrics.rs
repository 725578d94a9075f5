//! Single test per binary: `METRICS` is process-global, so counts here are exact.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use marketlens::client::{ClientError, HttpUpstreamClient, MarketDataSource};
use marketlens::monitoring::metrics::METRICS;
use marketlens::types::UpstreamConfig;

async fn non_numeric_price() -> Json<Value> {
    Json(json!({"price": "n/a"}))
}

#[tokio::test]
async fn coercion_failure_is_counted_as_failed_call() {
    let app = Router::new().route("/prices/last/:token", get(non_numeric_price));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpUpstreamClient::new(&UpstreamConfig {
        base_url: Some(format!("http://{addr}")),
        timeout_secs: 5,
        ..UpstreamConfig::default()
    })
    .unwrap();

    let before = METRICS.snapshot();
    let err = client.last_price("tok").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));

    let after = METRICS.snapshot();
    assert_eq!(after.upstream_requests - before.upstream_requests, 1);
    assert_eq!(after.upstream_failures - before.upstream_failures, 1);
}
