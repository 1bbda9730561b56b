//! Static Cluster Topology
//!
//! Which nodes exist, where they listen, and which peers each one may ask.
//! The topology is loaded once at startup, validated, and then only read.
//! There is no discovery and no runtime membership change.
//!
//! Peer lists are ordered: the node protocol walks them front to back, so the
//! configured order is also the tie-break order for lookups.

pub mod map;
pub mod types;

pub use map::{NodeEntry, Topology};
pub use types::{NodeId, NodeSpec, PeerRef, TopologyConfig};
