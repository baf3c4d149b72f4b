//! Proxy route handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::error::ApiError;
use super::snapshots::SnapshotPair;
use super::ProxyState;

type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub endpoint: Option<String>,
}

/// Checks an upstream path and returns it without leading slash
///
/// Only relative paths under the API root are forwarded: no scheme, no
/// protocol-relative `//host`, no `..` segments.
pub fn validate_endpoint(endpoint: Option<&str>) -> Result<String> {
    let endpoint = endpoint.map(str::trim).unwrap_or_default();
    if endpoint.is_empty() {
        return Err(ApiError::bad_request("Missing endpoint parameter"));
    }
    if endpoint.contains("://") || endpoint.starts_with("//") || endpoint.contains("..") {
        return Err(ApiError::bad_request(format!("Invalid endpoint: {}", endpoint)));
    }
    let relative = endpoint.trim_start_matches('/');
    if relative.is_empty() {
        return Err(ApiError::bad_request("Missing endpoint parameter"));
    }
    Ok(relative.to_string())
}

/// GET /health
pub async fn health_check() -> &'static str {
    "ok"
}

/// GET /fpl-proxy?endpoint=<path>
pub async fn fpl_proxy(
    State(state): State<Arc<ProxyState>>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response> {
    let endpoint = validate_endpoint(query.endpoint.as_deref())?;

    let upstream = state
        .client
        .get_raw(&endpoint)
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Upstream request failed: {}", e)))?;
    info!(%endpoint, status = upstream.status, bytes = upstream.body.len(), "proxied request");

    let status = StatusCode::from_u16(upstream.status)
        .map_err(|_| ApiError::bad_gateway(format!("Invalid upstream status {}", upstream.status)))?;
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(upstream.body))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// GET /price-snapshots
pub async fn price_snapshots(State(state): State<Arc<ProxyState>>) -> Result<Json<SnapshotPair>> {
    let now = state.clock.now();

    if let Some(pair) = state.snapshots.pair(now.date_naive())? {
        debug!(date = %pair.today.date, "serving recorded snapshot");
        return Ok(Json(pair));
    }

    let bootstrap = state.client.fetch_bootstrap().await?;
    let pair = state.snapshots.record(&bootstrap.elements, now)?;
    Ok(Json(pair))
}
