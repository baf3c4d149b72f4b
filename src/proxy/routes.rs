//! Proxy route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers;
use super::ProxyState;

pub fn create_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/fpl-proxy", get(handlers::fpl_proxy))
        .route("/price-snapshots", get(handlers::price_snapshots))
        .with_state(state)
}
