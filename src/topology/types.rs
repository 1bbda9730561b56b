use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Configured identity of a node, e.g. `"a"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Non-owning reference to another node: who it is and where it listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRef {
    pub id: NodeId,
    pub addr: SocketAddr,
}

/// One node as written in the topology file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub addr: String,
    #[serde(default)]
    pub peers: Vec<String>,
}

/// On-disk topology description.
///
/// ```json
/// { "nodes": [ { "id": "a", "addr": "127.0.0.1:8081", "peers": ["b", "c"] } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: Vec<NodeSpec>,
}
