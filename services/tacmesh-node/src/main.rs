use anyhow::{bail, Context};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use tacmesh_c2_router::{DashboardSnapshot, MeshConsole};
use tacmesh_core::{logging, Config};

const NODE_PROTOCOL_VERSION: u32 = 1;
const NODE_RUNTIME_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    runtime_version: u32,
    protocol_version: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--version-json") {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            runtime_version: NODE_RUNTIME_VERSION,
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let mut config = match parse_config_path(&args)? {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default_config(),
    };
    config.apply_env_overrides()?;
    logging::init_from_config(&config.logging)?;

    info!(
        tick_ms = config.simulation.tick_interval_ms,
        seed = ?config.simulation.seed,
        "Starting tacmesh-node"
    );
    let console = MeshConsole::start(&config)?;
    let mut updates = console.subscribe();
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                log_summary(&snapshot);
            }
            line = commands.next_line(), if stdin_open => match line {
                Ok(Some(line)) if !line.trim().is_empty() => match console.submit_text(&line) {
                    Ok(outcome) => {
                        for warning in &outcome.warnings {
                            warn!(command = outcome.command, "{warning}");
                        }
                    }
                    Err(err) => warn!(input = %line.trim(), error = %err, "Command rejected"),
                },
                Ok(Some(_)) => {}
                Ok(None) => stdin_open = false,
                Err(err) => {
                    warn!(error = %err, "Command input closed");
                    stdin_open = false;
                }
            },
        }
    }

    console.shutdown().await;
    Ok(())
}

fn log_summary(snapshot: &DashboardSnapshot) {
    let aggregate = &snapshot.aggregate;
    info!(
        tick = snapshot.tick,
        active = %aggregate.active_label(),
        encrypted = %aggregate.encrypted_label(),
        avg_signal = format_args!("{:.1}", aggregate.average_signal),
        avg_battery = format_args!("{:.1}", aggregate.average_battery),
        threats = snapshot.threats.len(),
        mesh_active = snapshot.mesh_active,
        "Dashboard update"
    );
}

fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            bail!("--config was provided without a path");
        }
    }

    Ok(None)
}
