//! Peer-Checked Key-Value Cluster
//!
//! Independent key-value nodes that keep keys approximately unique across the
//! cluster without any coordination service. Each node owns a private store
//! and, before accepting a new key, asks a fixed list of peers whether they
//! already hold it. Peers are asked exactly one hop deep and are never written.
//!
//! ## Modules
//! - **`storage`**: per-node record store (SQLite or memory) with soft delete.
//! - **`peer`**: the `KeyLookup` capability and its HTTP peer implementation.
//! - **`topology`**: static, validated node -> ordered peers wiring.
//! - **`node`**: the Save/Load protocol, including its known race window.
//! - **`rpc`**: HTTP/JSON boundary built on axum.
//! - **`config`**: command-line options for the node binary.
//! - **`error`**: error types and their stable wire kinds.

pub mod config;
pub mod error;
pub mod node;
pub mod peer;
pub mod rpc;
pub mod storage;
pub mod topology;
