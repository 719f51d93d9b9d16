//! API module
//!
//! HTTP endpoints, middleware, and the application router.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::ledger::LedgerEngine;

pub use routes::create_router;

/// Base path the wallet routes are mounted under
pub const API_BASE_PATH: &str = "/api";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LedgerEngine>,
}

impl AppState {
    pub fn new(engine: LedgerEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    // Layers run last-added first: context -> logging -> handler
    let api_routes = create_router()
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest(API_BASE_PATH, api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
