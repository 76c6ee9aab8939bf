//! C2 Router - operator command handling for the TacMesh dashboard
//!
//! This crate sits between an operator interface and the mesh state model.
//! It handles:
//! - Command definitions, parsed from wire names or tagged JSON
//! - Command execution against the entity store, with preconditions
//! - Node selection for the detail panel
//! - The system log feed
//! - A live console that runs telemetry and publishes dashboard snapshots
//!
//! # Architecture
//!
//! Commands flow through the following pipeline:
//! 1. Command received as text or JSON and parsed into a `MeshCommand`
//! 2. `MeshConsole::submit` takes the state lock
//! 3. `CommandController` checks preconditions and applies the effect
//! 4. Outcome or failure is written to the `SystemLog`
//! 5. A fresh `DashboardSnapshot` is published to subscribers
//!
//! # Examples
//!
//! ```no_run
//! use tacmesh_c2_router::{MeshCommand, MeshConsole};
//! use tacmesh_core::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let console = MeshConsole::start(&Config::default_config())?;
//! let outcome = console.submit(&MeshCommand::RotateKeys)?;
//! println!("{}", outcome.message);
//!
//! let mut updates = console.subscribe();
//! updates.changed().await?;
//! println!("{}", updates.borrow().aggregate.active_label());
//!
//! console.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod command_types;
pub mod console;
pub mod controller;
pub mod feeds;
pub mod selection;

pub use command_types::MeshCommand;
pub use console::{ConsoleError, DashboardSnapshot, MeshConsole};
pub use controller::{CommandController, CommandEffect, CommandError, CommandOutcome};
pub use feeds::{LogLevel, SystemLog, SystemLogEntry};
pub use selection::SelectionState;
