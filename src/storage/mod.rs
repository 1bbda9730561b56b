//! Per-Node Storage
//!
//! Each node owns exactly one store; no other node ever writes to it.
//!
//! ## Contents
//! - **`types`**: the `Record` model and the `Storage` contract consumed by the node protocol.
//! - **`sqlite`**: durable store, one SQLite file per node, soft delete via `deleted_at`.
//! - **`memory`**: volatile store with the same semantics, for tests and throwaway nodes.

pub mod memory;
pub mod sqlite;
pub mod types;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{Record, Storage};

#[cfg(test)]
mod tests;
