//! RPC Boundary
//!
//! Exposes a `NodeService` over HTTP/JSON with axum.
//!
//! - **`protocol`**: endpoint paths and request/response bodies.
//! - **`handlers`**: decode requests, call the node, encode results.
//!
//! Protocol outcomes (success, conflict, not found) are answered with `200`
//! and reported in the body. Only storage faults (`500`) and undecodable
//! requests (`400`) use error statuses.

pub mod handlers;
pub mod protocol;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::node::NodeService;
use handlers::{handle_health, handle_internal_load, handle_load, handle_save};
use protocol::{ENDPOINT_HEALTH, ENDPOINT_INTERNAL_LOAD, ENDPOINT_LOAD, ENDPOINT_SAVE};

pub fn router(node: Arc<NodeService>) -> Router {
    Router::new()
        .route(ENDPOINT_SAVE, post(handle_save))
        .route(ENDPOINT_LOAD, post(handle_load))
        .route(ENDPOINT_INTERNAL_LOAD, post(handle_internal_load))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(node))
}

/// Serves `node` on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, node: Arc<NodeService>) -> anyhow::Result<()> {
    axum::serve(listener, router(node)).await?;
    Ok(())
}

/// Waits on every server task and returns on the first failure or panic.
/// Servers still running are aborted when the set is dropped.
pub async fn supervise(mut servers: JoinSet<anyhow::Result<()>>) -> anyhow::Result<()> {
    while let Some(joined) = servers.join_next().await {
        joined??;
    }
    Ok(())
}
