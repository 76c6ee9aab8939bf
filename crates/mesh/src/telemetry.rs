//! Telemetry Simulator - bounded random walk over node telemetry
//!
//! Each tick nudges every node's signal by a uniform amount in
//! `[-jitter, +jitter]` and drains its battery by a uniform amount in
//! `[0, drain_max)`. Both values are clamped and status is re-derived by
//! the store. The random source is injectable so the walk is reproducible
//! from a seed.
//!
//! [`TelemetryTask`] drives ticks from a tokio interval and can be stopped
//! at any time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;
use tacmesh_core::SimulationConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::node::{clamp_percent_with_floor, NodeStatus, NodeUpdate};
use crate::store::EntityStore;

/// Random-walk bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Maximum absolute signal change per tick
    pub signal_jitter: f64,
    /// Maximum battery drain per tick
    pub battery_drain_max: f64,
    /// Lower clamp for signal strength
    pub signal_floor: f64,
    /// Battery level under which a node is reported low
    pub low_battery_threshold: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for SimulatorConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            signal_jitter: config.signal_jitter,
            battery_drain_max: config.battery_drain_max,
            signal_floor: config.signal_floor,
            low_battery_threshold: config.low_battery_threshold,
        }
    }
}

/// A node whose derived status changed during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub node_id: String,
    pub from: NodeStatus,
    pub to: NodeStatus,
}

/// What one tick changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick sequence number, starting at 1
    pub tick: u64,
    /// Status changes, in store order
    pub transitions: Vec<StatusTransition>,
    /// Nodes whose battery dropped below the low threshold this tick
    pub low_battery: Vec<String>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.transitions.is_empty() && self.low_battery.is_empty()
    }
}

/// Largest per-tick step; anything wider spans the whole percentage range.
const MAX_STEP: f64 = 100.0;

/// Usable sampling bound for a step size. NaN and non-positive values
/// disable the step.
fn step_bound(value: f64) -> f64 {
    if value > 0.0 {
        value.min(MAX_STEP)
    } else {
        0.0
    }
}

/// Applies the random walk to an [`EntityStore`].
#[derive(Debug)]
pub struct TelemetrySimulator<R = StdRng> {
    config: SimulatorConfig,
    rng: R,
    ticks: u64,
}

impl TelemetrySimulator<StdRng> {
    /// Deterministic simulator for a given seed
    pub fn from_seed(config: SimulatorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Simulator seeded from OS entropy
    pub fn from_entropy(config: SimulatorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> TelemetrySimulator<R> {
    pub fn with_rng(config: SimulatorConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Number of ticks applied so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Perturb every node once.
    pub fn tick(&mut self, store: &mut EntityStore) -> TickReport {
        let SimulatorConfig {
            signal_jitter,
            battery_drain_max,
            signal_floor,
            low_battery_threshold,
        } = self.config;
        let signal_jitter = step_bound(signal_jitter);
        let battery_drain_max = step_bound(battery_drain_max);
        let rng = &mut self.rng;

        let changes = store.update_each(|node| {
            let delta = if signal_jitter > 0.0 {
                rng.gen_range(-signal_jitter..=signal_jitter)
            } else {
                0.0
            };
            let drain = if battery_drain_max > 0.0 {
                rng.gen_range(0.0..battery_drain_max)
            } else {
                0.0
            };
            NodeUpdate::new()
                .signal_strength(clamp_percent_with_floor(
                    node.signal_strength() + delta,
                    signal_floor,
                ))
                .battery(node.battery() - drain)
        });

        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        for change in changes {
            if change.previous_status != change.status {
                report.transitions.push(StatusTransition {
                    node_id: change.node_id.clone(),
                    from: change.previous_status,
                    to: change.status,
                });
            }
            if change.previous_battery >= low_battery_threshold
                && change.battery < low_battery_threshold
            {
                report.low_battery.push(change.node_id);
            }
        }

        trace!(tick = self.ticks, nodes = store.node_count(), "Telemetry tick applied");
        report
    }
}

/// Periodic driver for telemetry ticks.
///
/// The callback runs on a tokio task once per period, the first call one
/// full period after spawn. Once [`TelemetryTask::stop`] is called (or the
/// task is dropped) the callback is never invoked again.
#[derive(Debug)]
pub struct TelemetryTask {
    cancel: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetryTask {
    /// Spawn the tick loop on the current tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel, mut cancelled) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = interval.tick() => {
                        if *cancelled.borrow() {
                            break;
                        }
                        on_tick();
                    }
                }
            }
            debug!("Telemetry task stopped");
        });
        debug!(period_ms = period.as_millis() as u64, "Telemetry task started");

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// True until the loop has exited
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Request cancellation without waiting for the loop to exit.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Cancel and wait for the loop to exit.
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TelemetryTask {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::reference_topology;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    fn seeded() -> EntityStore {
        EntityStore::from_seed(&reference_topology()).unwrap()
    }

    #[test]
    fn test_bounds_hold_over_many_ticks() {
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(SimulatorConfig::default(), 7);
        for _ in 0..2_000 {
            sim.tick(&mut store);
            for node in store.nodes() {
                assert!((0.0..=100.0).contains(&node.signal_strength()));
                assert!((0.0..=100.0).contains(&node.battery()));
                assert_eq!(node.status(), NodeStatus::from_signal(node.signal_strength()));
            }
        }
        assert_eq!(sim.ticks(), 2_000);
    }

    #[test]
    fn test_battery_never_increases() {
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(SimulatorConfig::default(), 11);
        for _ in 0..500 {
            let before: Vec<f64> = store.nodes().iter().map(|n| n.battery()).collect();
            sim.tick(&mut store);
            for (node, prev) in store.nodes().iter().zip(before) {
                assert!(node.battery() <= prev);
                assert!(prev - node.battery() < 0.1 + f64::EPSILON);
            }
        }
    }

    #[test]
    fn test_signal_step_is_bounded() {
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(SimulatorConfig::default(), 3);
        for _ in 0..500 {
            let before: Vec<f64> = store.nodes().iter().map(|n| n.signal_strength()).collect();
            sim.tick(&mut store);
            for (node, prev) in store.nodes().iter().zip(before) {
                assert!((node.signal_strength() - prev).abs() <= 5.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = seeded();
        let mut b = seeded();
        let mut sim_a = TelemetrySimulator::from_seed(SimulatorConfig::default(), 99);
        let mut sim_b = TelemetrySimulator::from_seed(SimulatorConfig::default(), 99);
        for _ in 0..50 {
            assert_eq!(sim_a.tick(&mut a), sim_b.tick(&mut b));
        }
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn test_signal_floor_respected() {
        let config = SimulatorConfig {
            signal_floor: 30.0,
            ..SimulatorConfig::default()
        };
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(config, 5);
        for _ in 0..1_000 {
            sim.tick(&mut store);
        }
        assert!(store.nodes().iter().all(|n| n.signal_strength() >= 30.0));
    }

    #[test]
    fn test_zero_bounds_freeze_telemetry() {
        let config = SimulatorConfig {
            signal_jitter: 0.0,
            battery_drain_max: 0.0,
            ..SimulatorConfig::default()
        };
        let mut store = seeded();
        let before = store.nodes().to_vec();
        let mut sim = TelemetrySimulator::from_seed(config, 1);
        let report = sim.tick(&mut store);
        assert!(report.is_quiet());
        assert_eq!(store.nodes(), before.as_slice());
    }

    #[test]
    fn test_oversized_steps_are_capped() {
        let config = SimulatorConfig {
            signal_jitter: 1e308,
            battery_drain_max: f64::INFINITY,
            ..SimulatorConfig::default()
        };
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(config, 5);
        for _ in 0..20 {
            sim.tick(&mut store);
            for node in store.nodes() {
                assert!((0.0..=100.0).contains(&node.signal_strength()));
                assert!((0.0..=100.0).contains(&node.battery()));
                assert_eq!(node.status(), NodeStatus::from_signal(node.signal_strength()));
            }
        }
        assert_eq!(sim.ticks(), 20);
    }

    #[test]
    fn test_nan_steps_freeze_telemetry() {
        let config = SimulatorConfig {
            signal_jitter: f64::NAN,
            battery_drain_max: f64::NAN,
            ..SimulatorConfig::default()
        };
        let mut store = seeded();
        let before = store.nodes().to_vec();
        TelemetrySimulator::from_seed(config, 5).tick(&mut store);
        assert_eq!(store.nodes(), before.as_slice());
    }

    #[test]
    fn test_low_battery_reported_once_on_crossing() {
        let config = SimulatorConfig {
            signal_jitter: 0.0,
            battery_drain_max: 1.0,
            low_battery_threshold: 33.5,
            ..SimulatorConfig::default()
        };
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(config, 21);
        let mut reported = Vec::new();
        for _ in 0..200 {
            reported.extend(sim.tick(&mut store).low_battery);
        }
        // NODE-003 starts at 34% and must cross 33.5% exactly once. NODE-006
        // starts below the threshold and is never reported.
        assert_eq!(reported.iter().filter(|id| *id == "NODE-003").count(), 1);
        assert!(!reported.iter().any(|id| id == "NODE-006"));
    }

    #[test]
    fn test_transitions_match_store() {
        let mut store = seeded();
        let mut sim = TelemetrySimulator::from_seed(SimulatorConfig::default(), 17);
        let mut total = 0;
        for _ in 0..200 {
            let report = sim.tick(&mut store);
            for transition in &report.transitions {
                assert_ne!(transition.from, transition.to);
                assert_eq!(store.node(&transition.node_id).unwrap().status(), transition.to);
            }
            total += report.transitions.len();
        }
        // NODE-003 starts five points under the active threshold.
        assert!(total > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_ticks_on_cadence() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let task = TelemetryTask::spawn(Duration::from_millis(2000), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_after_stop() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let task = TelemetryTask::spawn(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(350)).await;
        let seen = count.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        task.stop().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let task = TelemetryTask::spawn(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(task.is_running());
        drop(task);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_drives_simulator() {
        let store = Arc::new(Mutex::new(seeded()));
        let sim = Arc::new(Mutex::new(TelemetrySimulator::from_seed(
            SimulatorConfig::default(),
            42,
        )));
        let (store_ref, sim_ref) = (Arc::clone(&store), Arc::clone(&sim));
        let task = TelemetryTask::spawn(Duration::from_millis(2000), move || {
            let mut store = store_ref.lock().unwrap();
            sim_ref.lock().unwrap().tick(&mut store);
        });

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        task.stop().await;

        assert_eq!(sim.lock().unwrap().ticks(), 5);
        let store = store.lock().unwrap();
        assert!(store
            .nodes()
            .iter()
            .all(|n| (0.0..=100.0).contains(&n.signal_strength())));
    }
}
