//! Operator command definitions
//!
//! Commands travel from the dashboard as JSON objects tagged by name, e.g.
//! `{"command":"SELECT_NODE","node_id":"NODE-003"}`, or as plain text
//! (`SELECT_NODE NODE-003`) from a console.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::controller::CommandError;

/// Operator command enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeshCommand {
    /// Flip the global mesh switch
    ToggleMesh,
    /// Re-key every link; requires an active mesh
    RotateKeys,
    /// Recompute fleet metrics
    RefreshTopology,
    /// Recompute hop counts from the gateway
    OptimizeRoutes,
    /// Select a node for the detail panel
    SelectNode {
        /// Node to select
        node_id: String,
    },
    /// Clear the detail panel
    ClearSelection,
}

impl MeshCommand {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            MeshCommand::ToggleMesh => "TOGGLE_MESH",
            MeshCommand::RotateKeys => "ROTATE_KEYS",
            MeshCommand::RefreshTopology => "REFRESH_TOPOLOGY",
            MeshCommand::OptimizeRoutes => "OPTIMIZE_ROUTES",
            MeshCommand::SelectNode { .. } => "SELECT_NODE",
            MeshCommand::ClearSelection => "CLEAR_SELECTION",
        }
    }
}

impl fmt::Display for MeshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshCommand::SelectNode { node_id } => write!(f, "SELECT_NODE({node_id})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for MeshCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| CommandError::UnknownCommand(String::new()))?;

        let command = match name.to_ascii_uppercase().as_str() {
            "TOGGLE_MESH" => MeshCommand::ToggleMesh,
            "ROTATE_KEYS" => MeshCommand::RotateKeys,
            "REFRESH_TOPOLOGY" => MeshCommand::RefreshTopology,
            "OPTIMIZE_ROUTES" => MeshCommand::OptimizeRoutes,
            "CLEAR_SELECTION" => MeshCommand::ClearSelection,
            "SELECT_NODE" => {
                let node_id = parts
                    .next()
                    .ok_or(CommandError::MissingArgument("SELECT_NODE"))?;
                MeshCommand::SelectNode {
                    node_id: node_id.to_string(),
                }
            }
            _ => return Err(CommandError::UnknownCommand(s.trim().to_string())),
        };

        if let Some(extra) = parts.next() {
            return Err(CommandError::UnknownCommand(format!(
                "{}: unexpected argument {extra}",
                command.name()
            )));
        }
        Ok(command)
    }
}
