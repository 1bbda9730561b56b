//! Validated, immutable cluster wiring.

use super::types::{NodeId, NodeSpec, PeerRef, TopologyConfig};
use crate::error::TopologyError;

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;

/// A node together with its ordered peer list.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub id: NodeId,
    pub addr: SocketAddr,
    pub peers: Vec<PeerRef>,
}

/// Static mapping of node identity to ordered peers.
///
/// Built once at startup and never mutated. Construction rejects empty ids,
/// duplicate nodes, self references, repeated peers and peers that are not
/// themselves configured nodes.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<NodeEntry>,
    index: HashMap<NodeId, usize>,
}

impl Topology {
    pub fn from_config(config: TopologyConfig) -> Result<Self, TopologyError> {
        let mut addrs: HashMap<String, SocketAddr> = HashMap::new();
        for spec in &config.nodes {
            if spec.id.trim().is_empty() {
                return Err(TopologyError::EmptyNodeId);
            }
            let addr: SocketAddr = spec.addr.parse().map_err(|_| TopologyError::InvalidAddress {
                node: spec.id.clone(),
                addr: spec.addr.clone(),
            })?;
            if addrs.insert(spec.id.clone(), addr).is_some() {
                return Err(TopologyError::DuplicateNode(spec.id.clone()));
            }
        }

        let mut nodes = Vec::with_capacity(config.nodes.len());
        let mut index = HashMap::new();

        for spec in config.nodes {
            let peers = resolve_peers(&spec, &addrs)?;
            index.insert(NodeId::new(spec.id.clone()), nodes.len());
            nodes.push(NodeEntry {
                id: NodeId::new(spec.id.clone()),
                addr: addrs[&spec.id],
                peers,
            });
        }

        Ok(Self { nodes, index })
    }

    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        let config: TopologyConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TopologyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Four nodes `a`..`d` on consecutive ports, each peering with the other
    /// three in alphabetical order.
    pub fn four_node(host: &str, base_port: u16) -> Result<Self, TopologyError> {
        let ids = ["a", "b", "c", "d"];
        let mut nodes = Vec::with_capacity(ids.len());

        for (offset, id) in (0u16..).zip(ids) {
            let port = base_port
                .checked_add(offset)
                .ok_or_else(|| TopologyError::InvalidAddress {
                    node: id.to_string(),
                    addr: format!("{}:{}+{}", host, base_port, offset),
                })?;

            nodes.push(NodeSpec {
                id: id.to_string(),
                addr: format!("{}:{}", host, port),
                peers: ids
                    .iter()
                    .filter(|peer| **peer != id)
                    .map(|peer| peer.to_string())
                    .collect(),
            });
        }

        Self::from_config(TopologyConfig { nodes })
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeEntry> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn peers_of(&self, id: &NodeId) -> Result<&[PeerRef], TopologyError> {
        self.node(id)
            .map(|entry| entry.peers.as_slice())
            .ok_or_else(|| TopologyError::UnknownNode(id.to_string()))
    }

    /// Nodes in configuration order.
    pub fn nodes(&self) -> &[NodeEntry] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn resolve_peers(
    spec: &NodeSpec,
    addrs: &HashMap<String, SocketAddr>,
) -> Result<Vec<PeerRef>, TopologyError> {
    let mut seen = HashSet::new();
    let mut peers = Vec::with_capacity(spec.peers.len());

    for peer in &spec.peers {
        if peer == &spec.id {
            return Err(TopologyError::SelfReference(spec.id.clone()));
        }
        if !seen.insert(peer.as_str()) {
            return Err(TopologyError::DuplicatePeer {
                node: spec.id.clone(),
                peer: peer.clone(),
            });
        }
        let addr = addrs.get(peer).ok_or_else(|| TopologyError::UnknownPeer {
            node: spec.id.clone(),
            peer: peer.clone(),
        })?;
        peers.push(PeerRef {
            id: NodeId::new(peer.clone()),
            addr: *addr,
        });
    }

    Ok(peers)
}
