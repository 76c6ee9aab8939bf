//! Command controller
//!
//! Executes operator commands against the entity store. A command either
//! applies fully or leaves the store, selection and mesh flag untouched.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use tacmesh_core::{current_timestamp_ms, Config};
use tacmesh_mesh::{
    recompute_hops, AggregateSnapshot, EntityStore, HopReport, MeshError, StatusAggregator,
    TickReport,
};

use crate::command_types::MeshCommand;
use crate::feeds::SystemLog;
use crate::selection::SelectionState;

/// Command errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Command cannot run in the current state
    #[error("{command} rejected: {reason}")]
    Precondition {
        /// Rejected command
        command: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Entity store rejected the operation
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Unrecognized command text
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command requires an argument
    #[error("{0} requires a node id")]
    MissingArgument(&'static str),
}

/// What a successful command changed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CommandEffect {
    MeshToggled {
        mesh_active: bool,
    },
    KeysRotated {
        /// Links that were previously in the clear
        links_changed: usize,
    },
    TopologyRefreshed {
        aggregate: AggregateSnapshot,
    },
    RoutesOptimized {
        report: HopReport,
    },
    Selected {
        node_id: String,
    },
    SelectionCleared {
        previous: Option<String>,
    },
}

/// Result of a successful command, surfaced to the operator as a toast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub command: &'static str,
    /// `"Command executed: NAME"`
    pub message: String,
    pub timestamp_ms: u64,
    /// Non-fatal problems hit while executing
    pub warnings: Vec<String>,
    pub effect: CommandEffect,
}

impl CommandOutcome {
    fn new(command: &MeshCommand, effect: CommandEffect) -> Self {
        Self {
            command: command.name(),
            message: format!("Command executed: {}", command.name()),
            timestamp_ms: current_timestamp_ms(),
            warnings: Vec::new(),
            effect,
        }
    }
}

/// Controller state outside the entity store
#[derive(Debug, Clone)]
pub struct CommandController {
    mesh_active: bool,
    gateway: Option<String>,
    selection: SelectionState,
    log: SystemLog,
    aggregator: StatusAggregator,
}

impl Default for CommandController {
    fn default() -> Self {
        Self::new(true, None, SystemLog::default(), StatusAggregator::default())
    }
}

impl CommandController {
    pub fn new(
        mesh_active: bool,
        gateway: Option<String>,
        log: SystemLog,
        aggregator: StatusAggregator,
    ) -> Self {
        Self {
            mesh_active,
            gateway,
            selection: SelectionState::new(),
            log,
            aggregator,
        }
    }

    /// Build a controller from configuration. Without an explicit gateway the
    /// first node in the store is used.
    pub fn from_config(config: &Config, store: &EntityStore) -> Self {
        let gateway = config
            .mesh
            .gateway_id
            .clone()
            .or_else(|| store.nodes().first().map(|n| n.id().to_string()));

        Self::new(
            config.mesh.mesh_active,
            gateway,
            SystemLog::new(config.dashboard.log_retention),
            StatusAggregator::new(config.simulation.low_battery_threshold),
        )
    }

    /// Execute one command against the store.
    ///
    /// Failures are recorded in the system log as warnings and returned.
    pub fn execute(
        &mut self,
        store: &mut EntityStore,
        command: &MeshCommand,
    ) -> Result<CommandOutcome, CommandError> {
        debug!(command = %command, "Executing command");

        match self.apply(store, command) {
            Ok(outcome) => {
                info!(
                    command = outcome.command,
                    warnings = outcome.warnings.len(),
                    "{}",
                    outcome.message
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(command = %command, error = %err, "Command failed");
                self.log.warning(format!("{} failed: {err}", command.name()));
                Err(err)
            }
        }
    }

    fn apply(
        &mut self,
        store: &mut EntityStore,
        command: &MeshCommand,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            MeshCommand::ToggleMesh => {
                self.mesh_active = !self.mesh_active;
                self.log.info(if self.mesh_active {
                    "Mesh enabled"
                } else {
                    "Mesh disabled"
                });
                Ok(CommandOutcome::new(
                    command,
                    CommandEffect::MeshToggled {
                        mesh_active: self.mesh_active,
                    },
                ))
            }

            MeshCommand::RotateKeys => {
                if !self.mesh_active {
                    return Err(CommandError::Precondition {
                        command: command.name(),
                        reason: "mesh is inactive".to_string(),
                    });
                }
                let links_changed = store.encrypt_all();
                self.log.info("Key rotation successful");
                Ok(CommandOutcome::new(
                    command,
                    CommandEffect::KeysRotated { links_changed },
                ))
            }

            MeshCommand::RefreshTopology => {
                let aggregate = self.aggregator.snapshot(store);
                self.log.info("Topology refresh complete");
                Ok(CommandOutcome::new(
                    command,
                    CommandEffect::TopologyRefreshed { aggregate },
                ))
            }

            MeshCommand::OptimizeRoutes => {
                // an empty store has no default gateway
                let gateway = self.gateway.as_deref().ok_or_else(|| MeshError::NodeNotFound {
                    node_id: "<gateway>".to_string(),
                })?;
                let report = recompute_hops(store, gateway)?;

                let warnings: Vec<String> =
                    report.disconnected().iter().map(ToString::to_string).collect();
                for warning in &warnings {
                    self.log.warning(warning.clone());
                }
                self.log.info("Route optimization complete");

                let mut outcome =
                    CommandOutcome::new(command, CommandEffect::RoutesOptimized { report });
                outcome.warnings = warnings;
                Ok(outcome)
            }

            MeshCommand::SelectNode { node_id } => {
                self.selection.select(store, node_id)?;
                self.log.info(format!("Node {node_id} selected"));
                Ok(CommandOutcome::new(
                    command,
                    CommandEffect::Selected {
                        node_id: node_id.clone(),
                    },
                ))
            }

            MeshCommand::ClearSelection => {
                let previous = self.selection.clear();
                Ok(CommandOutcome::new(
                    command,
                    CommandEffect::SelectionCleared { previous },
                ))
            }
        }
    }

    /// Record the log-worthy parts of a telemetry tick.
    pub fn record_tick(&mut self, report: &TickReport) {
        for transition in &report.transitions {
            self.log.info(format!(
                "Node {} status {} -> {}",
                transition.node_id, transition.from, transition.to
            ));
        }
        for node_id in &report.low_battery {
            self.log.warning(format!("Node {node_id} battery low"));
        }
    }

    pub fn mesh_active(&self) -> bool {
        self.mesh_active
    }

    pub fn gateway(&self) -> Option<&str> {
        self.gateway.as_deref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn log(&self) -> &SystemLog {
        &self.log
    }

    pub fn aggregator(&self) -> &StatusAggregator {
        &self.aggregator
    }
}
