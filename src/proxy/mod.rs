//! HTTP proxy for the fantasy premier league API
//!
//! ## Endpoints
//!
//! - `GET /health` - liveness check
//! - `GET /fpl-proxy?endpoint=<path>` - forwards a GET to the upstream API
//! - `GET /price-snapshots` - today's and yesterday's price snapshots

mod error;
mod handlers;
mod routes;
pub mod snapshots;

pub use error::ApiError;
pub use handlers::validate_endpoint;
pub use routes::create_router;
pub use snapshots::{PriceChange, Snapshot, SnapshotError, SnapshotPair, SnapshotStore};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::clock::Clock;
use crate::data::FplClient;
use crate::store::KeyValueStore;

pub struct ProxyState {
    pub client: FplClient,
    pub snapshots: SnapshotStore<Arc<dyn KeyValueStore>>,
    pub clock: Arc<dyn Clock>,
}

impl ProxyState {
    pub fn new(client: FplClient, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            snapshots: SnapshotStore::new(store),
            clock,
        }
    }
}

pub struct ProxyServer {
    state: Arc<ProxyState>,
}

impl ProxyServer {
    pub fn new(state: ProxyState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Router with permissive CORS and request tracing
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    pub async fn run(self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(%addr, upstream = self.state.client.base_url(), "proxy listening");

        axum::serve(listener, self.router()).await
    }
}
