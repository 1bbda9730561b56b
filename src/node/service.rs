use super::locks::KeyLocks;
use crate::error::{NodeError, TopologyError};
use crate::peer::{HttpPeerLink, KeyLookup, StorageLookup};
use crate::storage::{Record, Storage};
use crate::topology::{NodeId, Topology};

use std::sync::Arc;
use std::time::Duration;

/// Where a Save stopped. `ConflictLocal`, `ConflictPeer` and `Commit` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    LocalCheck,
    ConflictLocal,
    PeerScan,
    ConflictPeer,
    Commit,
}

/// Save/Load protocol engine of one node.
///
/// Owns the node's storage (the only place it ever writes) and an ordered
/// list of read-only peer lookups.
pub struct NodeService {
    id: NodeId,
    storage: Arc<dyn Storage>,
    local: StorageLookup,
    peers: Vec<Arc<dyn KeyLookup>>,
    key_locks: KeyLocks,
}

impl NodeService {
    pub fn new(id: NodeId, storage: Arc<dyn Storage>, peers: Vec<Arc<dyn KeyLookup>>) -> Self {
        let local = StorageLookup::new(id.to_string(), storage.clone());
        Self {
            id,
            storage,
            local,
            peers,
            key_locks: KeyLocks::default(),
        }
    }

    /// Wires `id` to its configured peers over HTTP.
    pub fn from_topology(
        topology: &Topology,
        id: NodeId,
        storage: Arc<dyn Storage>,
        http_client: reqwest::Client,
        peer_timeout: Duration,
    ) -> Result<Self, TopologyError> {
        let peers = topology
            .peers_of(&id)?
            .iter()
            .map(|peer| {
                Arc::new(HttpPeerLink::new(
                    peer.clone(),
                    http_client.clone(),
                    peer_timeout,
                )) as Arc<dyn KeyLookup>
            })
            .collect();

        Ok(Self::new(id, storage, peers))
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn peer_names(&self) -> Vec<String> {
        self.peers.iter().map(|peer| peer.describe()).collect()
    }

    /// Stores `key` unless it is already visible locally or on any reachable peer.
    ///
    /// Check-then-act with no cross-node lock: two nodes saving the same key
    /// at the same time can both succeed.
    pub async fn save(&self, key: &str, value: &str) -> Result<Record, NodeError> {
        let _guard = self.key_locks.lock(key).await;

        tracing::debug!(node = %self.id, key, phase = ?SavePhase::LocalCheck, "save");
        if self.local.find(key)?.is_some() {
            tracing::debug!(node = %self.id, key, phase = ?SavePhase::ConflictLocal, "save");
            return Err(NodeError::KeyConflict);
        }

        tracing::debug!(node = %self.id, key, phase = ?SavePhase::PeerScan, "save");
        if let Some((peer, _)) = self.scan_peers(key).await {
            tracing::debug!(
                node = %self.id,
                key,
                peer = %peer,
                phase = ?SavePhase::ConflictPeer,
                "save"
            );
            return Err(NodeError::KeyConflict);
        }

        let record = self.storage.create(key, value).map_err(|e| {
            tracing::error!("Node {}: failed to store key {}: {}", self.id, key, e);
            NodeError::Storage(e)
        })?;
        tracing::debug!(node = %self.id, key, phase = ?SavePhase::Commit, "save");
        tracing::info!("Node {} saved key: {} value: {}", self.id, key, value);

        Ok(record)
    }

    /// Returns the value of `key` from local storage or, if `ask_others`, from
    /// the first peer in configured order that has it.
    pub async fn load(&self, key: &str, ask_others: bool) -> Result<String, NodeError> {
        if let Some(value) = self.local.find(key)? {
            tracing::debug!("LOAD: Found key {} locally on {}", key, self.id);
            return Ok(value);
        }

        if !ask_others {
            return Err(NodeError::KeyNotFound);
        }

        match self.scan_peers(key).await {
            Some((peer, value)) => {
                tracing::debug!("LOAD: Fetched key {} from peer {}", key, peer);
                Ok(value)
            }
            None => Err(NodeError::KeyNotFound),
        }
    }

    /// One-hop answer for peers: local storage only.
    pub async fn load_local(&self, key: &str) -> Result<String, NodeError> {
        self.load(key, false).await
    }

    /// Asks each peer once, in order, and stops at the first hit. Peer
    /// failures count as misses.
    async fn scan_peers(&self, key: &str) -> Option<(String, String)> {
        for peer in &self.peers {
            match peer.load(key).await {
                Ok(Some(value)) => return Some((peer.describe(), value)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        kind = ?e.kind(),
                        "Node {}: peer {} lookup failed, treating as not found: {}",
                        self.id,
                        peer.describe(),
                        e
                    );
                }
            }
        }
        None
    }
}
