//! Remote peer lookup over HTTP.
//!
//! Calls the peer's local-only endpoint, so the peer answers from its own
//! store and the fanout stops after one hop. Each call is bounded by a
//! timeout and made exactly once.

use super::lookup::KeyLookup;
use crate::error::{ErrorKind, LookupError, NodeError};
use crate::rpc::protocol::{ENDPOINT_INTERNAL_LOAD, LoadRequest, LoadResponse};
use crate::topology::PeerRef;

use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_millis(500);

pub struct HttpPeerLink {
    peer: PeerRef,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpPeerLink {
    pub fn new(peer: PeerRef, http_client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            peer,
            http_client,
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("http://{}{}", self.peer.addr, ENDPOINT_INTERNAL_LOAD)
    }

    fn transport_error(&self, source: reqwest::Error) -> LookupError {
        LookupError::Transport {
            peer: self.peer.id.to_string(),
            source,
        }
    }
}

#[async_trait]
impl KeyLookup for HttpPeerLink {
    async fn load(&self, key: &str) -> Result<Option<String>, LookupError> {
        let payload = LoadRequest {
            key: key.to_string(),
            ask_others: None,
        };

        let response = self
            .http_client
            .post(self.url())
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(LookupError::Status {
                peer: self.peer.id.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: LoadResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        match body.err.as_deref() {
            None | Some("") => Ok(Some(body.value)),
            Some(message) if is_not_found(body.kind, message) => Ok(None),
            Some(message) => Err(LookupError::Remote {
                peer: self.peer.id.to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("{}@{}", self.peer.id, self.peer.addr)
    }
}

// Peers that predate the `kind` field only send the human string.
fn is_not_found(kind: Option<ErrorKind>, message: &str) -> bool {
    match kind {
        Some(kind) => kind == ErrorKind::KeyNotFound,
        None => message == NodeError::KeyNotFound.to_string(),
    }
}
