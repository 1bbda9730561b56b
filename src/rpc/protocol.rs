//! Node Network Protocol
//!
//! Request and response bodies for the Save/Load endpoints, exchanged as JSON
//! over HTTP both by external callers and by peers.
//!
//! An absent or empty `err` means success. When `err` is set, `kind` carries
//! the stable machine-readable error tag next to the human string.

use crate::error::{ErrorKind, NodeError};
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Public endpoint for storing a new key.
pub const ENDPOINT_SAVE: &str = "/save";
/// Public endpoint for reading a key, optionally asking peers.
pub const ENDPOINT_LOAD: &str = "/load";
/// Peer endpoint answering from local storage only (one hop).
pub const ENDPOINT_INTERNAL_LOAD: &str = "/internal/load";
/// Liveness and basic node information.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failed(kind: ErrorKind, err: impl Into<String>) -> Self {
        Self {
            err: Some(err.into()),
            kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.err.as_deref().is_none_or(str::is_empty)
    }
}

impl From<&NodeError> for SaveResponse {
    fn from(e: &NodeError) -> Self {
        Self::failed(e.kind(), e.to_string())
    }
}

/// Read request. `ask_others` is only honoured on the public endpoint and
/// defaults to asking peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_others: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadResponse {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl LoadResponse {
    pub fn found(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn failed(kind: ErrorKind, err: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            err: Some(err.into()),
            kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.err.as_deref().is_none_or(str::is_empty)
    }
}

impl From<&NodeError> for LoadResponse {
    fn from(e: &NodeError) -> Self {
        Self::failed(e.kind(), e.to_string())
    }
}

/// `records` is left out when the store could not be counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    pub peers: Vec<String>,
}
