//! TacMesh Mesh - telemetry state model for the tactical mesh dashboard
//!
//! Holds the canonical node and link records and evolves them over time.
//!
//! # Core Components
//!
//! - **Entity Store**: nodes and links, with status derived from signal
//! - **Telemetry Simulator**: bounded random walk over signal and battery,
//!   driven by a cancellable tokio interval
//! - **Status Aggregator**: fleet metrics and a threat feed derived from
//!   current state
//! - **Routing**: breadth-first hop counts from the gateway
//!
//! # Example Usage
//!
//! ```rust
//! use tacmesh_mesh::{reference_topology, EntityStore, SimulatorConfig, StatusAggregator, TelemetrySimulator};
//!
//! # fn main() -> Result<(), tacmesh_mesh::MeshError> {
//! let mut store = EntityStore::from_seed(&reference_topology())?;
//! let mut simulator = TelemetrySimulator::from_seed(SimulatorConfig::default(), 7);
//! simulator.tick(&mut store);
//!
//! let snapshot = StatusAggregator::default().snapshot(&store);
//! assert_eq!(snapshot.total_nodes, 6);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod error;
pub mod node;
pub mod routing;
pub mod seed;
pub mod store;
pub mod telemetry;

// Re-export main types
pub use aggregate::{AggregateSnapshot, StatusAggregator, ThreatEntry, ThreatKind, ThreatSeverity};
pub use error::{MeshError, MeshResult};
pub use node::{clamp_percent, Connection, Node, NodeStatus, NodeUpdate, Position};
pub use routing::{hop_counts, recompute_hops, HopReport, RouteEntry};
pub use seed::{reference_topology, REFERENCE_GATEWAY};
pub use store::{EntityStore, NodeChange};
pub use telemetry::{
    SimulatorConfig, StatusTransition, TelemetrySimulator, TelemetryTask, TickReport,
};
