//! Node selection for the detail panel

use serde::Serialize;
use tacmesh_mesh::{EntityStore, MeshResult, Node};

/// At most one selected node id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    selected: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `node_id` if the store knows it; otherwise leave the current
    /// selection as it is.
    pub fn select(&mut self, store: &EntityStore, node_id: &str) -> MeshResult<()> {
        store.node(node_id)?;
        self.selected = Some(node_id.to_string());
        Ok(())
    }

    /// Clear and return the previous selection.
    pub fn clear(&mut self) -> Option<String> {
        self.selected.take()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Current record of the selected node
    pub fn selected_node<'a>(&self, store: &'a EntityStore) -> Option<&'a Node> {
        self.selected.as_deref().and_then(|id| store.node(id).ok())
    }
}
