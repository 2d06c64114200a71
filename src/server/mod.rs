//! HTTP surface
//!
//! A small axum app: the JSON API under `/api` and the server-rendered
//! viewer page at `/`. All handlers share one [`AppState`] carrying the
//! table source and the default page size.

pub mod api;
mod markup;
mod page;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ViewerResult;
use crate::source::TableSource;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TableSource>,
    pub page_size_default: usize,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/api/health", get(api::health))
        .route("/api/sheets", get(api::sheets))
        .route("/api/data", get(api::data))
        .route("/api/columns", get(api::columns))
        .route("/api/validate-timestamp", get(api::validate_timestamp))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the listen address and serve until the process exits
pub async fn serve(state: AppState, addr: &str) -> ViewerResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
