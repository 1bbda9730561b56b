//! Key Lookup & Peer Links
//!
//! A single capability, `KeyLookup`, answers "is this key here, and what is
//! its value?" for one store. The node protocol uses it both for its own
//! storage (`StorageLookup`) and for each configured peer (`HttpPeerLink`).
//! Lookups are read-only; writes never leave the local node.
//!
//! A failed peer lookup is reported as `LookupError`, which the node protocol
//! treats exactly like "not found".

pub mod http;
pub mod lookup;

pub use http::{DEFAULT_PEER_TIMEOUT, HttpPeerLink};
pub use lookup::{KeyLookup, StorageLookup};
