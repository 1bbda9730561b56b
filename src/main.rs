use anyhow::Context;
use clap::Parser;
use peer_kv::config::NodeArgs;
use peer_kv::node::NodeService;
use peer_kv::rpc;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = NodeArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    // 1. Topology:
    let topology = args.load_topology().context("invalid topology")?;
    let selected = args.selected_nodes(&topology)?;
    tracing::info!(
        "Topology has {} node(s), hosting {:?}",
        topology.len(),
        selected.iter().map(|id| id.to_string()).collect::<Vec<_>>()
    );

    // 2. Storage and node services. Any store that fails to open aborts startup.
    let http_client = reqwest::Client::new();
    let mut services = Vec::new();
    for id in selected {
        let storage = args
            .open_store(&id)
            .with_context(|| format!("failed to open store for node {}", id))?;
        let records = storage.count()?;

        let node = NodeService::from_topology(
            &topology,
            id.clone(),
            storage,
            http_client.clone(),
            args.peer_timeout(),
        )?;
        tracing::info!(
            "Node {} ready with {} record(s), peers: {:?}",
            id,
            records,
            node.peer_names()
        );
        services.push(Arc::new(node));
    }

    // 3. HTTP servers:
    let mut servers = JoinSet::new();
    for node in services {
        let addr = topology
            .node(node.id())
            .map(|entry| entry.addr)
            .context("node missing from topology")?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        tracing::info!("Node {} listening on {}", node.id(), addr);
        servers.spawn(rpc::serve(listener, node));
    }

    tracing::info!("Press Ctrl+C to shutdown");

    // One failed server brings the process down
    rpc::supervise(servers).await
}
