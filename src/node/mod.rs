//! Node Service
//!
//! The Save/Load protocol that gives the cluster its best-effort key
//! uniqueness without any coordination layer.
//!
//! ## Save
//! 1. Local storage has the key: conflict.
//! 2. Any peer, asked in configured order, has the key: conflict.
//! 3. Otherwise commit to local storage.
//!
//! ## Load
//! Local storage first. Peers are only asked when the caller sets
//! `ask_others`, and the first peer in configured order that has the key wins.
//!
//! Peers are read-only and one hop deep. A peer that fails to answer is
//! treated as not having the key. Nothing is retried.
//!
//! Saves of the same key on one node are serialized by `KeyLocks`. Saves of
//! the same key on different nodes are not, so concurrent Saves can leave the
//! key on two nodes with different values.

pub mod locks;
pub mod service;

pub use locks::{KeyGuard, KeyLocks};
pub use service::{NodeService, SavePhase};
