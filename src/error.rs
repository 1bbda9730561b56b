//! Error Model
//!
//! Errors are split by where they may travel:
//! - `NodeError` is what the Save/Load protocol returns to callers.
//! - `LookupError` is internal to the peer scan and is absorbed there.
//! - `StorageError` and `TopologyError` come from the collaborators.
//!
//! Every error maps to an `ErrorKind`, a stable machine-checkable tag that the
//! RPC boundary sends next to the human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error tag carried on the wire in the `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    KeyConflict,
    KeyNotFound,
    PeerUnreachable,
    StorageError,
    DecodeError,
}

/// Outcome errors of the Save/Load protocol.
///
/// `KeyConflict` and `KeyNotFound` are normal protocol results and the RPC
/// layer reports them inside a successful response. `Storage` is a local
/// persistence fault.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Key already exists")]
    KeyConflict,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NodeError::KeyConflict => ErrorKind::KeyConflict,
            NodeError::KeyNotFound => ErrorKind::KeyNotFound,
            NodeError::Storage(_) => ErrorKind::StorageError,
        }
    }
}

/// Failure of a single peer lookup. Never surfaced to a caller.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("peer {peer} unreachable: {source}")]
    Transport {
        peer: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },

    #[error("peer {peer} reported an error: {message}")]
    Remote { peer: String, message: String },

    #[error("local lookup failed: {0}")]
    Storage(#[from] StorageError),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::PeerUnreachable
    }
}

/// Local persistence failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned during {0}")]
    Poisoned(&'static str),
}

/// Invalid static cluster wiring. Fatal at startup.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("node id must not be empty")]
    EmptyNodeId,

    #[error("node {0} is configured more than once")]
    DuplicateNode(String),

    #[error("node {0} lists itself as a peer")]
    SelfReference(String),

    #[error("node {node} lists peer {peer} more than once")]
    DuplicatePeer { node: String, peer: String },

    #[error("node {node} lists unknown peer {peer}")]
    UnknownPeer { node: String, peer: String },

    #[error("node {0} is not part of the topology")]
    UnknownNode(String),

    #[error("invalid address {addr} for node {node}")]
    InvalidAddress { node: String, addr: String },

    #[error("failed to read topology file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse topology: {0}")]
    Parse(#[from] serde_json::Error),
}
