//! Test utilities for cross-crate scenarios

use tacmesh_c2_router::MeshConsole;
use tacmesh_core::{Config, LinkSeed, NodeSeed, TopologySeed};
use tacmesh_mesh::NodeStatus;

/// Install a test-friendly subscriber once; later calls are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Default configuration with a fixed simulator seed
pub fn seeded_config(seed: u64) -> Config {
    let mut config = Config::default_config();
    config.simulation.seed = Some(seed);
    config
}

/// Console over the reference topology, telemetry not started
pub fn reference_console(seed: u64) -> MeshConsole {
    MeshConsole::new(&seeded_config(seed)).expect("reference console")
}

pub fn node_seed(id: &str, signal: f64, battery: f64, hops: u32) -> NodeSeed {
    NodeSeed {
        id: id.to_string(),
        x: 0.0,
        y: 0.0,
        signal_strength: signal,
        battery,
        encrypted: true,
        hops,
    }
}

pub fn link_seed(from: &str, to: &str, encrypted: bool) -> LinkSeed {
    LinkSeed {
        from: from.to_string(),
        to: to.to_string(),
        strength: 70.0,
        encrypted,
    }
}

/// Gateway with a two-node chain plus an island node with no links
pub fn island_topology() -> TopologySeed {
    TopologySeed {
        nodes: vec![
            node_seed("GW", 95.0, 90.0, 0),
            node_seed("RELAY", 75.0, 80.0, 9),
            node_seed("EDGE", 55.0, 15.0, 9),
            node_seed("ISLAND", 40.0, 60.0, 6),
        ],
        connections: vec![link_seed("GW", "RELAY", true), link_seed("RELAY", "EDGE", false)],
    }
}

/// Statuses in store order
pub fn statuses(console: &MeshConsole) -> Vec<NodeStatus> {
    console.snapshot().nodes.iter().map(|n| n.status()).collect()
}
