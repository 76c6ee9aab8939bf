//! Error types for TacMesh state model operations.
//!
//! Every variant is local to the operation that raised it; none of them
//! stops the telemetry simulator.

use thiserror::Error;

/// Errors that can occur in mesh store and routing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// Referenced node id is not in the store
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// Requested node id
        node_id: String,
    },

    /// Connection endpoint does not exist
    #[error("Invalid reference: link {from} -> {to} names unknown node {missing}")]
    InvalidReference {
        /// Link source
        from: String,
        /// Link destination
        to: String,
        /// The endpoint that is absent
        missing: String,
    },

    /// Connection from a node to itself
    #[error("Invalid link: {node_id} cannot link to itself")]
    SelfLink {
        /// Offending node id
        node_id: String,
    },

    /// Node id already present
    #[error("Duplicate node id: {node_id}")]
    DuplicateNode {
        /// Offending node id
        node_id: String,
    },

    /// Node cannot be reached from the gateway over existing links
    #[error("Node {node_id} is unreachable from gateway {gateway}")]
    DisconnectedGraph {
        /// Unreachable node id
        node_id: String,
        /// Gateway the search started from
        gateway: String,
    },
}

impl MeshError {
    pub(crate) fn not_found(node_id: &str) -> Self {
        MeshError::NodeNotFound {
            node_id: node_id.to_string(),
        }
    }
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
