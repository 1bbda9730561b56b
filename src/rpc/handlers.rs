use axum::{Extension, Json, body::Bytes, http::StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::protocol::{HealthResponse, LoadRequest, LoadResponse, SaveRequest, SaveResponse};
use crate::error::{ErrorKind, NodeError};
use crate::node::NodeService;

fn status_for(e: &NodeError) -> StatusCode {
    match e {
        NodeError::KeyConflict | NodeError::KeyNotFound => StatusCode::OK,
        NodeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Bodies are parsed as JSON whatever `Content-Type` the client sent.
fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, serde_json::Error> {
    serde_json::from_slice(body)
}

pub async fn handle_save(
    Extension(node): Extension<Arc<NodeService>>,
    body: Bytes,
) -> (StatusCode, Json<SaveResponse>) {
    let req: SaveRequest = match decode(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Failed to decode save request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(SaveResponse::failed(ErrorKind::DecodeError, e.to_string())),
            );
        }
    };

    let span = tracing::info_span!("save", request_id = %Uuid::new_v4(), node = %node.id());
    async move {
        match node.save(&req.key, &req.value).await {
            Ok(_) => (StatusCode::OK, Json(SaveResponse::ok())),
            Err(e) => {
                tracing::debug!("Save of {} rejected: {}", req.key, e);
                (status_for(&e), Json(SaveResponse::from(&e)))
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn handle_load(
    Extension(node): Extension<Arc<NodeService>>,
    body: Bytes,
) -> (StatusCode, Json<LoadResponse>) {
    let req = match decode_load(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let ask_others = req.ask_others.unwrap_or(true);

    let span = tracing::info_span!("load", request_id = %Uuid::new_v4(), node = %node.id());
    load_response(node.load(&req.key, ask_others).instrument(span).await)
}

/// Peer-facing load: never consults this node's own peers.
pub async fn handle_internal_load(
    Extension(node): Extension<Arc<NodeService>>,
    body: Bytes,
) -> (StatusCode, Json<LoadResponse>) {
    let req = match decode_load(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let span =
        tracing::debug_span!("internal_load", request_id = %Uuid::new_v4(), node = %node.id());
    load_response(node.load_local(&req.key).instrument(span).await)
}

pub async fn handle_health(
    Extension(node): Extension<Arc<NodeService>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, records) = match node.storage().count() {
        Ok(count) => (StatusCode::OK, Some(count)),
        Err(e) => {
            tracing::error!("Health check failed to count records: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, None)
        }
    };

    (
        status,
        Json(HealthResponse {
            node: node.id().to_string(),
            records,
            peers: node.peer_names(),
        }),
    )
}

fn decode_load(body: &Bytes) -> Result<LoadRequest, (StatusCode, Json<LoadResponse>)> {
    decode(body).map_err(|e| {
        tracing::warn!("Failed to decode load request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(LoadResponse::failed(ErrorKind::DecodeError, e.to_string())),
        )
    })
}

fn load_response(result: Result<String, NodeError>) -> (StatusCode, Json<LoadResponse>) {
    match result {
        Ok(value) => (StatusCode::OK, Json(LoadResponse::found(value))),
        Err(e) => {
            if let NodeError::Storage(_) = e {
                tracing::error!("Load failed: {}", e);
            }
            (status_for(&e), Json(LoadResponse::from(&e)))
        }
    }
}
