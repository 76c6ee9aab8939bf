//! Hop-count routing from the gateway
//!
//! Every link has unit cost, so the shortest path is a breadth-first search
//! over the undirected link set. Nodes the search cannot reach keep their
//! previous hop count.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};
use crate::node::NodeUpdate;
use crate::store::EntityStore;

/// Hop count change for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Node identifier
    pub node_id: String,
    /// Hop count before recomputation
    pub previous_hops: u32,
    /// Hop count after recomputation
    pub hops: u32,
}

/// Result of a full hop recomputation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopReport {
    /// Search origin
    pub gateway: String,
    /// One entry per reachable node, in store order
    pub routes: Vec<RouteEntry>,
    /// Nodes with no path to the gateway, in store order
    pub unreachable: Vec<String>,
}

impl HopReport {
    /// Number of nodes whose hop count actually changed
    pub fn changed_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|r| r.previous_hops != r.hops)
            .count()
    }

    /// One `DisconnectedGraph` error per unreachable node
    pub fn disconnected(&self) -> Vec<MeshError> {
        self.unreachable
            .iter()
            .map(|node_id| MeshError::DisconnectedGraph {
                node_id: node_id.clone(),
                gateway: self.gateway.clone(),
            })
            .collect()
    }
}

/// Shortest hop count from `gateway` to every reachable node.
pub fn hop_counts(store: &EntityStore, gateway: &str) -> MeshResult<HashMap<String, u32>> {
    store.node(gateway)?;

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in store.connections() {
        adjacency.entry(link.from()).or_default().push(link.to());
        adjacency.entry(link.to()).or_default().push(link.from());
    }

    let mut distances: HashMap<String, u32> = HashMap::new();
    let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
    distances.insert(gateway.to_string(), 0);
    queue.push_back((gateway, 0));

    while let Some((current, depth)) = queue.pop_front() {
        for &next in adjacency.get(current).into_iter().flatten() {
            if !distances.contains_key(next) {
                distances.insert(next.to_string(), depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }

    Ok(distances)
}

/// Recompute and write hop counts for every node.
///
/// Unreachable nodes are reported (and logged) but not modified.
pub fn recompute_hops(store: &mut EntityStore, gateway: &str) -> MeshResult<HopReport> {
    let distances = hop_counts(store, gateway)?;

    let mut routes = Vec::new();
    let mut unreachable = Vec::new();
    let ids: Vec<(String, u32)> = store
        .nodes()
        .iter()
        .map(|n| (n.id().to_string(), n.hops()))
        .collect();

    for (node_id, previous_hops) in ids {
        match distances.get(&node_id) {
            Some(&hops) => {
                store.update_node(&node_id, NodeUpdate::new().hops(hops))?;
                routes.push(RouteEntry {
                    node_id,
                    previous_hops,
                    hops,
                });
            }
            None => {
                warn!(node_id = %node_id, gateway, "Node unreachable from gateway, hop count kept");
                unreachable.push(node_id);
            }
        }
    }

    let report = HopReport {
        gateway: gateway.to_string(),
        routes,
        unreachable,
    };
    debug!(
        gateway,
        changed = report.changed_count(),
        unreachable = report.unreachable.len(),
        "Hop counts recomputed"
    );
    Ok(report)
}
