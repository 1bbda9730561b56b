//! Command-line configuration for a node process.
//!
//! A process hosts either one node of the topology (`--node a`) or every node
//! (`--all`), each on the address the topology gives it. Without
//! `--topology`, the built-in four-node mesh `a`..`d` is used.

use crate::error::{StorageError, TopologyError};
use crate::peer::DEFAULT_PEER_TIMEOUT;
use crate::storage::{MemoryStore, SqliteStore, Storage};
use crate::topology::{NodeId, Topology};

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "peer-kv")]
#[command(author, version, about = "Key-value node with one-hop peer uniqueness checks", long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["node", "all"])))]
pub struct NodeArgs {
    /// JSON topology file; defaults to the built-in four-node mesh
    #[arg(long)]
    pub topology: Option<PathBuf>,

    /// Host of the built-in mesh
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// First port of the built-in mesh; nodes use consecutive ports
    #[arg(long, default_value_t = 8081)]
    pub base_port: u16,

    /// Id of the node to run
    #[arg(long)]
    pub node: Option<String>,

    /// Run every node of the topology in this process
    #[arg(long)]
    pub all: bool,

    /// Directory holding one SQLite file per node
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Keep records in memory only
    #[arg(long)]
    pub in_memory: bool,

    /// Upper bound for a single peer lookup
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT.as_millis() as u64)]
    pub peer_timeout_ms: u64,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

impl NodeArgs {
    pub fn load_topology(&self) -> Result<Topology, TopologyError> {
        match &self.topology {
            Some(path) => Topology::load(path),
            None => Topology::four_node(&self.host, self.base_port),
        }
    }

    /// Nodes this process should host, in topology order.
    pub fn selected_nodes(&self, topology: &Topology) -> Result<Vec<NodeId>, TopologyError> {
        if self.all {
            return Ok(topology.nodes().iter().map(|n| n.id.clone()).collect());
        }

        let id = NodeId::new(self.node.clone().unwrap_or_default());
        if topology.node(&id).is_none() {
            return Err(TopologyError::UnknownNode(id.to_string()));
        }
        Ok(vec![id])
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn store_path(&self, id: &NodeId) -> PathBuf {
        self.data_dir.join(format!("{}.db", id))
    }

    pub fn open_store(&self, id: &NodeId) -> Result<Arc<dyn Storage>, StorageError> {
        if self.in_memory {
            return Ok(Arc::new(MemoryStore::new()));
        }
        Ok(Arc::new(SqliteStore::open(self.store_path(id))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_node_or_all() {
        assert!(NodeArgs::try_parse_from(["peer-kv"]).is_err());
        assert!(NodeArgs::try_parse_from(["peer-kv", "--node", "a", "--all"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = NodeArgs::try_parse_from(["peer-kv", "--node", "b"]).unwrap();

        assert_eq!(args.peer_timeout(), Duration::from_millis(500));
        assert_eq!(args.log_level, tracing::Level::INFO);
        assert!(!args.in_memory);
        assert_eq!(
            args.store_path(&NodeId::from("b")),
            PathBuf::from("data").join("b.db")
        );

        let topology = args.load_topology().unwrap();
        assert_eq!(topology.len(), 4);
        assert_eq!(
            topology.node(&NodeId::from("b")).unwrap().addr,
            "127.0.0.1:8082".parse().unwrap()
        );
        assert_eq!(args.selected_nodes(&topology).unwrap(), vec![NodeId::from("b")]);
    }

    #[test]
    fn test_all_selects_every_node() {
        let args = NodeArgs::try_parse_from(["peer-kv", "--all", "--base-port", "9100"]).unwrap();
        let topology = args.load_topology().unwrap();

        let ids: Vec<String> = args
            .selected_nodes(&topology)
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let args = NodeArgs::try_parse_from(["peer-kv", "--node", "z"]).unwrap();
        let topology = args.load_topology().unwrap();
        assert!(matches!(
            args.selected_nodes(&topology),
            Err(TopologyError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_open_store_variants() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap().to_string();

        let args = NodeArgs::try_parse_from([
            "peer-kv",
            "--node",
            "a",
            "--data-dir",
            data_dir.as_str(),
            "--log-level",
            "debug",
            "--peer-timeout-ms",
            "50",
        ])
        .unwrap();
        assert_eq!(args.log_level, tracing::Level::DEBUG);
        assert_eq!(args.peer_timeout(), Duration::from_millis(50));

        let store = args.open_store(&NodeId::from("a")).unwrap();
        store.create("k", "v").unwrap();
        assert!(dir.path().join("a.db").exists());

        let memory = NodeArgs::try_parse_from(["peer-kv", "--node", "a", "--in-memory"]).unwrap();
        let store = memory.open_store(&NodeId::from("a")).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
