//! Entity Store - canonical node and link records
//!
//! Nodes keep their insertion order (the order the dashboard renders them
//! in). Links are validated against the node set when inserted.

use std::collections::HashMap;

use tacmesh_core::TopologySeed;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::node::{Connection, Node, NodeStatus, NodeUpdate, Position};

/// Before/after view of one node touched by a bulk update.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeChange {
    pub node_id: String,
    pub previous_status: NodeStatus,
    pub status: NodeStatus,
    pub previous_battery: f64,
    pub battery: f64,
}

/// In-memory set of nodes and connections.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a topology seed. Nodes are inserted first, then
    /// links; the first invalid record aborts construction.
    pub fn from_seed(seed: &TopologySeed) -> MeshResult<Self> {
        let mut store = Self::new();
        for node in &seed.nodes {
            store.insert_node(Node::new(
                node.id.clone(),
                Position::new(node.x, node.y),
                node.signal_strength,
                node.battery,
                node.encrypted,
                node.hops,
            ))?;
        }
        for link in &seed.connections {
            store.insert_connection(Connection::new(
                link.from.clone(),
                link.to.clone(),
                link.strength,
                link.encrypted,
            ))?;
        }
        debug!(
            nodes = store.nodes.len(),
            connections = store.connections.len(),
            "Entity store seeded"
        );
        Ok(store)
    }

    /// Insert a node; ids must be unique.
    pub fn insert_node(&mut self, node: Node) -> MeshResult<()> {
        if self.index.contains_key(node.id()) {
            return Err(MeshError::DuplicateNode {
                node_id: node.id().to_string(),
            });
        }
        self.index.insert(node.id().to_string(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Insert a link; both endpoints must already exist and differ.
    pub fn insert_connection(&mut self, connection: Connection) -> MeshResult<()> {
        if connection.from() == connection.to() {
            return Err(MeshError::SelfLink {
                node_id: connection.from().to_string(),
            });
        }
        for endpoint in [connection.from(), connection.to()] {
            if !self.contains(endpoint) {
                return Err(MeshError::InvalidReference {
                    from: connection.from().to_string(),
                    to: connection.to().to_string(),
                    missing: endpoint.to_string(),
                });
            }
        }
        self.connections.push(connection);
        Ok(())
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All links in insertion order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    /// Look up a node by id
    pub fn node(&self, node_id: &str) -> MeshResult<&Node> {
        self.index
            .get(node_id)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| MeshError::not_found(node_id))
    }

    /// Apply a partial update to one node. Numeric fields are re-clamped and
    /// status is re-derived.
    pub fn update_node(&mut self, node_id: &str, update: NodeUpdate) -> MeshResult<&Node> {
        let i = *self
            .index
            .get(node_id)
            .ok_or_else(|| MeshError::not_found(node_id))?;
        let node = &mut self.nodes[i];
        node.apply(&update);
        Ok(node)
    }

    /// Apply an update computed per node to every node, in order.
    pub(crate) fn update_each<F>(&mut self, mut f: F) -> Vec<NodeChange>
    where
        F: FnMut(&Node) -> NodeUpdate,
    {
        self.nodes
            .iter_mut()
            .map(|node| {
                let previous_status = node.status();
                let previous_battery = node.battery();
                let update = f(&*node);
                node.apply(&update);
                NodeChange {
                    node_id: node.id().to_string(),
                    previous_status,
                    status: node.status(),
                    previous_battery,
                    battery: node.battery(),
                }
            })
            .collect()
    }

    /// Ids adjacent to `node_id` over any link, in link order.
    pub fn neighbors(&self, node_id: &str) -> MeshResult<Vec<&str>> {
        if !self.contains(node_id) {
            return Err(MeshError::not_found(node_id));
        }
        Ok(self
            .connections
            .iter()
            .filter_map(|link| link.other_end(node_id))
            .collect())
    }

    /// Mark every link and node encrypted. Returns the number of links that
    /// were previously unencrypted.
    pub fn encrypt_all(&mut self) -> usize {
        let mut changed = 0;
        for link in self.connections.iter_mut().filter(|l| !l.encrypted()) {
            link.set_encrypted(true);
            changed += 1;
        }
        for node in self.nodes.iter_mut().filter(|n| !n.encrypted()) {
            node.apply(&NodeUpdate::new().encrypted(true));
        }
        changed
    }
}
