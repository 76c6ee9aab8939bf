//! Telemetry ticks running alongside operator commands

use crate::test_utils::*;
use std::time::Duration;
use tacmesh_c2_router::{MeshCommand, MeshConsole};

#[tokio::test(start_paused = true)]
async fn test_bounds_and_drain_over_live_ticks() {
    init_test_logging();
    let mut config = seeded_config(11);
    config.simulation.tick_interval_ms = 100;
    let console = MeshConsole::start(&config).unwrap();
    let mut updates = console.subscribe();

    let mut previous = console.snapshot();
    for _ in 0..50 {
        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        for (node, before) in snapshot.nodes.iter().zip(&previous.nodes) {
            assert!((0.0..=100.0).contains(&node.signal_strength()));
            assert!((0.0..=100.0).contains(&node.battery()));
            assert!(node.battery() <= before.battery());
        }
        previous = snapshot;
    }
    assert!(previous.tick >= 50);

    console.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_commands_interleave_with_ticks() {
    let mut config = seeded_config(12);
    config.simulation.tick_interval_ms = 2_000;
    let console = MeshConsole::start(&config).unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    console.submit(&MeshCommand::RotateKeys).unwrap();
    tokio::time::sleep(Duration::from_millis(2_000)).await;

    let snapshot = console.snapshot();
    assert_eq!(snapshot.tick, 2);
    assert!(snapshot.connections.iter().all(|c| c.encrypted()));
    assert!(snapshot
        .log
        .iter()
        .any(|e| e.message == "Key rotation successful"));

    console.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_freezes_state() {
    let console = MeshConsole::start(&seeded_config(13)).unwrap();
    tokio::time::sleep(Duration::from_millis(6_500)).await;
    console.shutdown().await;

    let frozen = console.snapshot();
    assert_eq!(frozen.tick, 3);
    tokio::time::sleep(Duration::from_secs(60)).await;

    let later = console.snapshot();
    assert_eq!(later.tick, 3);
    assert_eq!(later.nodes, frozen.nodes);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_runs_are_reproducible() {
    let a = MeshConsole::start(&seeded_config(99)).unwrap();
    let b = MeshConsole::start(&seeded_config(99)).unwrap();
    tokio::time::sleep(Duration::from_millis(20_500)).await;
    a.shutdown().await;
    b.shutdown().await;

    assert_eq!(a.snapshot().tick, 10);
    assert_eq!(a.snapshot().nodes, b.snapshot().nodes);
}
