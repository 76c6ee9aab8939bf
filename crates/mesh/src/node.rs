//! Mesh node and link records.
//!
//! Numeric telemetry is clamped to `[0, 100]` on construction and on every
//! update, and a node's status is re-derived from its signal strength each
//! time. Fields are private so no caller can store a status that disagrees
//! with the signal.

use serde::Serialize;
use std::fmt;

/// Signal strength below which a node is critical.
pub const CRITICAL_SIGNAL_THRESHOLD: f64 = 50.0;

/// Signal strength below which a node is in warning.
pub const WARNING_SIGNAL_THRESHOLD: f64 = 70.0;

/// Clamp a percentage into `[floor, 100]`. NaN maps to `floor`.
pub fn clamp_percent_with_floor(value: f64, floor: f64) -> f64 {
    if value.is_nan() {
        return floor;
    }
    value.clamp(floor.min(100.0), 100.0)
}

/// Clamp a percentage into `[0, 100]`. NaN maps to 0.
pub fn clamp_percent(value: f64) -> f64 {
    clamp_percent_with_floor(value, 0.0)
}

/// Derived node health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Signal at or above the warning threshold
    Active,
    /// Signal in `[50, 70)`
    Warning,
    /// Signal below 50
    Critical,
}

impl NodeStatus {
    /// Map a signal percentage to a status. Total over all inputs.
    pub fn from_signal(signal_strength: f64) -> Self {
        if signal_strength < CRITICAL_SIGNAL_THRESHOLD {
            NodeStatus::Critical
        } else if signal_strength < WARNING_SIGNAL_THRESHOLD {
            NodeStatus::Warning
        } else {
            NodeStatus::Active
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeStatus::Active => "ACTIVE",
            NodeStatus::Warning => "WARNING",
            NodeStatus::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Layout coordinate on the topology canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A simulated mesh participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    id: String,
    position: Position,
    status: NodeStatus,
    signal_strength: f64,
    battery: f64,
    encrypted: bool,
    hops: u32,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        position: Position,
        signal_strength: f64,
        battery: f64,
        encrypted: bool,
        hops: u32,
    ) -> Self {
        let signal_strength = clamp_percent(signal_strength);
        Self {
            id: id.into(),
            position,
            status: NodeStatus::from_signal(signal_strength),
            signal_strength,
            battery: clamp_percent(battery),
            encrypted,
            hops,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn signal_strength(&self) -> f64 {
        self.signal_strength
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn hops(&self) -> u32 {
        self.hops
    }

    /// Apply a partial update, re-clamp, and re-derive status.
    pub(crate) fn apply(&mut self, update: &NodeUpdate) {
        if let Some(signal) = update.signal_strength {
            self.signal_strength = clamp_percent(signal);
        }
        if let Some(battery) = update.battery {
            self.battery = clamp_percent(battery);
        }
        if let Some(encrypted) = update.encrypted {
            self.encrypted = encrypted;
        }
        if let Some(hops) = update.hops {
            self.hops = hops;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        self.status = NodeStatus::from_signal(self.signal_strength);
    }
}

/// Partial node mutation. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub signal_strength: Option<f64>,
    pub battery: Option<f64>,
    pub encrypted: Option<bool>,
    pub hops: Option<u32>,
    pub position: Option<Position>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal_strength(mut self, value: f64) -> Self {
        self.signal_strength = Some(value);
        self
    }

    pub fn battery(mut self, value: f64) -> Self {
        self.battery = Some(value);
        self
    }

    pub fn encrypted(mut self, value: bool) -> Self {
        self.encrypted = Some(value);
        self
    }

    pub fn hops(mut self, value: u32) -> Self {
        self.hops = Some(value);
        self
    }

    pub fn position(mut self, value: Position) -> Self {
        self.position = Some(value);
        self
    }
}

/// An undirected link between two nodes, stored as an ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    from: String,
    to: String,
    strength: f64,
    encrypted: bool,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>, strength: f64, encrypted: bool) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            strength: clamp_percent(strength),
            encrypted,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    /// The endpoint opposite `node_id`, if `node_id` is an endpoint.
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.from == node_id {
            Some(&self.to)
        } else if self.to == node_id {
            Some(&self.from)
        } else {
            None
        }
    }

    /// `FROM<->TO`
    pub fn label(&self) -> String {
        format!("{}<->{}", self.from, self.to)
    }

    pub(crate) fn set_encrypted(&mut self, encrypted: bool) {
        self.encrypted = encrypted;
    }
}
