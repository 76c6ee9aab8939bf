//! Configuration management for TacMesh.
//!
//! Every section has defaults matching the reference dashboard, so an empty
//! TOML file (or no file at all) yields a runnable configuration.

use serde::{Deserialize, Serialize};
#[cfg(feature = "toml-config")]
use std::path::Path;

use crate::error::{CoreError, Result};

/// Environment variable overriding `simulation.tick_interval_ms`.
pub const ENV_TICK_MS: &str = "TACMESH_TICK_MS";
/// Environment variable overriding `simulation.seed`.
pub const ENV_SEED: &str = "TACMESH_SEED";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub mesh: MeshConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

/// Telemetry simulator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tick cadence in milliseconds
    pub tick_interval_ms: u64,
    /// RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Maximum absolute signal change per tick (percentage points)
    pub signal_jitter: f64,
    /// Maximum battery drain per tick (percentage points)
    pub battery_drain_max: f64,
    /// Lower clamp for signal strength
    pub signal_floor: f64,
    /// Battery percentage under which a node is reported as low
    pub low_battery_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            seed: None,
            signal_jitter: 5.0,
            battery_drain_max: 0.1,
            signal_floor: 0.0,
            low_battery_threshold: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Reference node for hop counts; first seeded node when absent
    pub gateway_id: Option<String>,
    /// Initial state of the global mesh switch
    pub mesh_active: bool,
    /// Explicit topology; the reference six-node mesh when absent
    pub topology: Option<TopologySeed>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            gateway_id: None,
            mesh_active: true,
            topology: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Maximum number of system log entries retained
    pub log_retention: usize,
    /// Number of recent log entries included in each snapshot
    pub log_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_retention: 100,
            log_window: 4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Seed record for one mesh node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSeed {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub signal_strength: f64,
    pub battery: f64,
    pub encrypted: bool,
    #[serde(default)]
    pub hops: u32,
}

/// Seed record for one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSeed {
    pub from: String,
    pub to: String,
    pub strength: f64,
    pub encrypted: bool,
}

/// Initial mesh topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySeed {
    pub nodes: Vec<NodeSeed>,
    #[serde(default)]
    pub connections: Vec<LinkSeed>,
}

impl Config {
    #[cfg(feature = "toml-config")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Apply `TACMESH_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TICK_MS) {
            self.simulation.tick_interval_ms = raw
                .trim()
                .parse()
                .map_err(|_| CoreError::InvalidConfig(format!("{ENV_TICK_MS}={raw}")))?;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw
                .trim()
                .parse()
                .map_err(|_| CoreError::InvalidConfig(format!("{ENV_SEED}={raw}")))?;
            self.simulation.seed = Some(seed);
        }
        self.validate()
    }

    /// Reject values the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "simulation.tick_interval_ms must be positive".to_string(),
            ));
        }
        // walk steps are bounded by the percentage range
        for (name, value) in [
            ("simulation.signal_jitter", sim.signal_jitter),
            ("simulation.battery_drain_max", sim.battery_drain_max),
            ("simulation.signal_floor", sim.signal_floor),
            ("simulation.low_battery_threshold", sim.low_battery_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }
        if self.dashboard.log_retention == 0 {
            return Err(CoreError::InvalidConfig(
                "dashboard.log_retention must be positive".to_string(),
            ));
        }
        if self.dashboard.log_window > self.dashboard.log_retention {
            return Err(CoreError::InvalidConfig(format!(
                "dashboard.log_window ({}) exceeds log_retention ({})",
                self.dashboard.log_window, self.dashboard.log_retention
            )));
        }
        Ok(())
    }
}
