//! Status Aggregator - fleet-level metrics and derived threat feed
//!
//! Everything here is recomputed from the store on each call; nothing is
//! cached between ticks.

use serde::Serialize;

use crate::node::NodeStatus;
use crate::store::EntityStore;

/// Point-in-time fleet metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    pub total_nodes: usize,
    pub active_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    /// Mean signal strength, 0 for an empty fleet
    pub average_signal: f64,
    /// Mean battery, 0 for an empty fleet
    pub average_battery: f64,
    pub encrypted_links: usize,
    pub total_links: usize,
    /// Encrypted links / all links, 0 when there are no links
    pub encrypted_link_ratio: f64,
}

impl AggregateSnapshot {
    /// `"5/6"` style active counter
    pub fn active_label(&self) -> String {
        format!("{}/{}", self.active_count, self.total_nodes)
    }

    /// `"5/6"` style encrypted link counter
    pub fn encrypted_label(&self) -> String {
        format!("{}/{}", self.encrypted_links, self.total_links)
    }
}

/// Kind of derived threat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatKind {
    /// Node signal below the critical threshold
    SignalCritical,
    /// Battery below the low-battery threshold
    BatteryLow,
    /// Link carrying traffic in the clear
    LinkUnencrypted,
}

/// Threat severity, most severe first when sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatSeverity {
    Critical,
    High,
    Medium,
}

/// One entry in the threat monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatEntry {
    pub kind: ThreatKind,
    pub severity: ThreatSeverity,
    /// Node id or `FROM<->TO` link label
    pub location: String,
    pub detail: String,
}

/// Computes fleet metrics and threats from an [`EntityStore`].
#[derive(Debug, Clone)]
pub struct StatusAggregator {
    low_battery_threshold: f64,
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl StatusAggregator {
    pub fn new(low_battery_threshold: f64) -> Self {
        Self {
            low_battery_threshold,
        }
    }

    /// Fleet metrics for the current store contents.
    pub fn snapshot(&self, store: &EntityStore) -> AggregateSnapshot {
        let nodes = store.nodes();
        let links = store.connections();

        let mut snapshot = AggregateSnapshot {
            total_nodes: nodes.len(),
            total_links: links.len(),
            encrypted_links: links.iter().filter(|l| l.encrypted()).count(),
            ..AggregateSnapshot::default()
        };

        for node in nodes {
            match node.status() {
                NodeStatus::Active => snapshot.active_count += 1,
                NodeStatus::Warning => snapshot.warning_count += 1,
                NodeStatus::Critical => snapshot.critical_count += 1,
            }
        }

        if !nodes.is_empty() {
            let count = nodes.len() as f64;
            snapshot.average_signal =
                nodes.iter().map(|n| n.signal_strength()).sum::<f64>() / count;
            snapshot.average_battery = nodes.iter().map(|n| n.battery()).sum::<f64>() / count;
        }
        if !links.is_empty() {
            snapshot.encrypted_link_ratio = snapshot.encrypted_links as f64 / links.len() as f64;
        }

        snapshot
    }

    /// Threats derived from current node and link state, most severe first.
    pub fn threats(&self, store: &EntityStore) -> Vec<ThreatEntry> {
        let mut threats = Vec::new();

        for node in store.nodes() {
            if node.status() == NodeStatus::Critical {
                threats.push(ThreatEntry {
                    kind: ThreatKind::SignalCritical,
                    severity: ThreatSeverity::Critical,
                    location: node.id().to_string(),
                    detail: format!("signal {:.0}%", node.signal_strength()),
                });
            }
            if node.battery() < self.low_battery_threshold {
                threats.push(ThreatEntry {
                    kind: ThreatKind::BatteryLow,
                    severity: ThreatSeverity::High,
                    location: node.id().to_string(),
                    detail: format!("battery {:.0}%", node.battery()),
                });
            }
        }

        for link in store.connections().iter().filter(|l| !l.encrypted()) {
            threats.push(ThreatEntry {
                kind: ThreatKind::LinkUnencrypted,
                severity: ThreatSeverity::Medium,
                location: link.label(),
                detail: format!("link strength {:.0}%", link.strength()),
            });
        }

        // stable: keeps store order within a severity
        threats.sort_by_key(|t| t.severity);
        threats
    }
}
