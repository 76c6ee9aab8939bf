//! Live mesh console
//!
//! Owns the entity store and command controller behind a single mutex.
//! Telemetry ticks and commands both run to completion while holding it, and
//! a fresh [`DashboardSnapshot`] is published on a watch channel after each.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use tacmesh_core::{current_timestamp_ms, Config, CoreError};
use tacmesh_mesh::{
    reference_topology, AggregateSnapshot, Connection, EntityStore, MeshError, Node,
    SimulatorConfig, TelemetrySimulator, TelemetryTask, ThreatEntry, TickReport,
};

use crate::command_types::MeshCommand;
use crate::controller::{CommandController, CommandError, CommandOutcome};
use crate::feeds::SystemLogEntry;

/// Console construction errors
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Topology error: {0}")]
    Mesh(#[from] MeshError),
}

/// Everything a dashboard renders, captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub aggregate: AggregateSnapshot,
    pub threats: Vec<ThreatEntry>,
    pub selection: Option<String>,
    /// Current record of the selected node
    pub selected_node: Option<Node>,
    pub mesh_active: bool,
    /// Recent log window, newest first
    pub log: Vec<SystemLogEntry>,
    /// Telemetry ticks applied so far
    pub tick: u64,
    pub generated_at_ms: u64,
}

struct ConsoleState {
    store: EntityStore,
    controller: CommandController,
    simulator: TelemetrySimulator,
    log_window: usize,
}

impl ConsoleState {
    fn snapshot(&self) -> DashboardSnapshot {
        let aggregator = self.controller.aggregator();
        let selection = self.controller.selection();
        DashboardSnapshot {
            nodes: self.store.nodes().to_vec(),
            connections: self.store.connections().to_vec(),
            aggregate: aggregator.snapshot(&self.store),
            threats: aggregator.threats(&self.store),
            selection: selection.selected().map(str::to_string),
            selected_node: selection.selected_node(&self.store).cloned(),
            mesh_active: self.controller.mesh_active(),
            log: self.controller.log().recent(self.log_window),
            tick: self.simulator.ticks(),
            generated_at_ms: current_timestamp_ms(),
        }
    }

    fn tick(&mut self) -> TickReport {
        let report = self.simulator.tick(&mut self.store);
        self.controller.record_tick(&report);
        report
    }
}

/// Single-writer runtime around the mesh state model.
pub struct MeshConsole {
    state: Arc<Mutex<ConsoleState>>,
    updates: Arc<watch::Sender<DashboardSnapshot>>,
    telemetry: Mutex<Option<TelemetryTask>>,
    tick_interval: Duration,
}

fn lock(state: &Mutex<ConsoleState>) -> MutexGuard<'_, ConsoleState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// Publishing while the state lock is held keeps snapshots in mutation order.
fn publish(state: &ConsoleState, updates: &watch::Sender<DashboardSnapshot>) {
    updates.send_replace(state.snapshot());
}

impl MeshConsole {
    /// Build the console without starting telemetry.
    ///
    /// Uses the configured topology, or the reference topology when none is
    /// given. The simulator is seeded from `simulation.seed` when present.
    pub fn new(config: &Config) -> Result<Self, ConsoleError> {
        config.validate()?;

        let seed = config.mesh.topology.clone().unwrap_or_else(reference_topology);
        let store = EntityStore::from_seed(&seed)?;
        if let Some(gateway) = &config.mesh.gateway_id {
            store.node(gateway)?;
        }

        let sim_config = SimulatorConfig::from(&config.simulation);
        let simulator = match config.simulation.seed {
            Some(seed) => TelemetrySimulator::from_seed(sim_config, seed),
            None => TelemetrySimulator::from_entropy(sim_config),
        };
        let controller = CommandController::from_config(config, &store);

        info!(
            nodes = store.node_count(),
            links = store.connection_count(),
            gateway = controller.gateway().unwrap_or("-"),
            "Mesh console initialized"
        );

        let state = ConsoleState {
            store,
            controller,
            simulator,
            log_window: config.dashboard.log_window,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            updates: Arc::new(updates),
            telemetry: Mutex::new(None),
            tick_interval: Duration::from_millis(config.simulation.tick_interval_ms),
        })
    }

    /// Build the console and start the telemetry task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &Config) -> Result<Self, ConsoleError> {
        let console = Self::new(config)?;
        console.start_telemetry();
        Ok(console)
    }

    /// Start periodic ticks. Does nothing if they are already running.
    pub fn start_telemetry(&self) {
        let mut telemetry = self
            .telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if telemetry.as_ref().is_some_and(TelemetryTask::is_running) {
            return;
        }

        let state = Arc::clone(&self.state);
        let updates = Arc::clone(&self.updates);
        *telemetry = Some(TelemetryTask::spawn(self.tick_interval, move || {
            let mut state = lock(&state);
            let report = state.tick();
            if !report.is_quiet() {
                debug!(
                    tick = report.tick,
                    transitions = report.transitions.len(),
                    low_battery = report.low_battery.len(),
                    "Telemetry tick"
                );
            }
            publish(&state, &updates);
        }));
    }

    /// Apply one telemetry tick immediately.
    pub fn tick_now(&self) -> TickReport {
        let mut state = lock(&self.state);
        let report = state.tick();
        publish(&state, &self.updates);
        report
    }

    /// Execute an operator command. A snapshot is published whether or not
    /// the command succeeds.
    pub fn submit(&self, command: &MeshCommand) -> Result<CommandOutcome, CommandError> {
        let mut state = lock(&self.state);
        let ConsoleState {
            store, controller, ..
        } = &mut *state;
        let result = controller.execute(store, command);
        publish(&state, &self.updates);
        result
    }

    /// Parse and execute a text command such as `SELECT_NODE NODE-003`.
    pub fn submit_text(&self, text: &str) -> Result<CommandOutcome, CommandError> {
        let command: MeshCommand = text.parse()?;
        self.submit(&command)
    }

    /// Fresh snapshot of current state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        lock(&self.state).snapshot()
    }

    /// Receiver that sees a new snapshot after every tick and command.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.updates.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(TelemetryTask::is_running)
    }

    /// Stop telemetry. No tick is applied after this returns.
    pub async fn shutdown(&self) {
        let task = self
            .telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.stop().await;
            info!("Mesh console stopped");
        }
    }
}
