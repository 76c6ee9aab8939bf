//! Reference topology: six field nodes and six links.

use tacmesh_core::{LinkSeed, NodeSeed, TopologySeed};

/// Gateway of the reference topology.
pub const REFERENCE_GATEWAY: &str = "NODE-001";

fn node(id: &str, x: f64, y: f64, signal: f64, battery: f64, encrypted: bool, hops: u32) -> NodeSeed {
    NodeSeed {
        id: id.to_string(),
        x,
        y,
        signal_strength: signal,
        battery,
        encrypted,
        hops,
    }
}

fn link(from: &str, to: &str, strength: f64, encrypted: bool) -> LinkSeed {
    LinkSeed {
        from: from.to_string(),
        to: to.to_string(),
        strength,
        encrypted,
    }
}

/// The six-node mesh the dashboard starts with.
pub fn reference_topology() -> TopologySeed {
    TopologySeed {
        nodes: vec![
            node("NODE-001", 50.0, 50.0, 95.0, 87.0, true, 0),
            node("NODE-002", 150.0, 100.0, 88.0, 92.0, true, 1),
            node("NODE-003", 250.0, 80.0, 65.0, 34.0, true, 2),
            node("NODE-004", 350.0, 120.0, 82.0, 78.0, true, 3),
            node("NODE-005", 150.0, 200.0, 91.0, 85.0, true, 2),
            node("NODE-006", 300.0, 220.0, 45.0, 12.0, false, 4),
        ],
        connections: vec![
            link("NODE-001", "NODE-002", 92.0, true),
            link("NODE-002", "NODE-003", 76.0, true),
            link("NODE-003", "NODE-004", 73.0, true),
            link("NODE-002", "NODE-005", 89.0, true),
            link("NODE-005", "NODE-006", 58.0, false),
            link("NODE-003", "NODE-006", 62.0, true),
        ],
    }
}
