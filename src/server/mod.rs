use std::sync::Arc;

use axum::{
    handler::Handler,
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::MarketDataSource;

pub mod error;
pub mod handlers;

pub use error::ApiError;

/// Shared handler state. The source is stateless, so requests never contend.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn MarketDataSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

/// GET-only route; other methods fall through to `not_found`.
fn read_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(handlers::not_found)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", read_only(handlers::health))
        .route("/api/search", read_only(handlers::search))
        .route("/api/resolve", read_only(handlers::resolve))
        .route("/api/market/resolve", read_only(handlers::resolve))
        .route("/api/market", read_only(handlers::market))
        .route("/api/price", read_only(handlers::price))
        .route("/api/midpoint", read_only(handlers::midpoint))
        .route("/api/book", read_only(handlers::book))
        .route("/api/trades", read_only(handlers::trades))
        .route("/api/tags", read_only(handlers::tags))
        .route("/api/history", read_only(handlers::history))
        .fallback(handlers::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
