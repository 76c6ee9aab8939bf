//! Operator command flows through the console

use crate::test_utils::*;
use tacmesh_c2_router::{CommandEffect, CommandError, LogLevel, MeshCommand, MeshConsole};
use tacmesh_core::Config;
use tacmesh_mesh::{MeshError, NodeStatus};

#[test]
fn test_reference_dashboard_state() {
    init_test_logging();
    let console = reference_console(1);

    assert_eq!(
        statuses(&console),
        vec![
            NodeStatus::Active,
            NodeStatus::Active,
            NodeStatus::Warning,
            NodeStatus::Active,
            NodeStatus::Active,
            NodeStatus::Critical,
        ]
    );
    let snapshot = console.snapshot();
    assert_eq!(snapshot.aggregate.active_label(), "4/6");
    assert_eq!(snapshot.aggregate.encrypted_label(), "5/6");
    assert!(snapshot.selection.is_none());
}

#[test]
fn test_operator_session() {
    init_test_logging();
    let console = reference_console(2);

    let outcome = console.submit(&MeshCommand::OptimizeRoutes).unwrap();
    assert_eq!(outcome.message, "Command executed: OPTIMIZE_ROUTES");
    let hops: Vec<u32> = console.snapshot().nodes.iter().map(|n| n.hops()).collect();
    assert_eq!(hops, vec![0, 1, 2, 3, 2, 3]);

    console.submit(&MeshCommand::RotateKeys).unwrap();
    let snapshot = console.snapshot();
    assert_eq!(snapshot.aggregate.encrypted_link_ratio, 1.0);
    assert!(snapshot.threats.iter().all(|t| !t.location.contains("<->")));

    console.submit_text("select_node NODE-006").unwrap();
    let snapshot = console.snapshot();
    let selected = snapshot.selected_node.expect("selected node");
    assert_eq!(selected.status(), NodeStatus::Critical);
    assert!(selected.encrypted());

    console.submit(&MeshCommand::ClearSelection).unwrap();
    assert!(console.snapshot().selection.is_none());

    let messages: Vec<String> = console
        .snapshot()
        .log
        .iter()
        .map(|e| e.message.clone())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Node NODE-006 selected",
            "Key rotation successful",
            "Route optimization complete",
        ]
    );
}

#[test]
fn test_inactive_mesh_blocks_rotation() {
    let console = reference_console(3);
    console.submit(&MeshCommand::ToggleMesh).unwrap();

    let before = console.snapshot();
    let err = console.submit(&MeshCommand::RotateKeys).unwrap_err();
    assert!(matches!(err, CommandError::Precondition { .. }));

    let after = console.snapshot();
    assert_eq!(before.connections, after.connections);
    assert_eq!(before.nodes, after.nodes);
    assert!(!after.mesh_active);
    assert_eq!(after.log[0].level, LogLevel::Warning);
    assert_eq!(after.log[1].message, "Mesh disabled");
}

#[test]
fn test_unknown_selection_is_rejected() {
    let console = reference_console(4);
    console.submit_text("SELECT_NODE NODE-002").unwrap();

    let err = console.submit_text("SELECT_NODE NODE-999").unwrap_err();
    assert_eq!(
        err,
        CommandError::Mesh(MeshError::NodeNotFound {
            node_id: "NODE-999".to_string()
        })
    );
    assert_eq!(console.snapshot().selection.as_deref(), Some("NODE-002"));
}

#[test]
fn test_island_node_keeps_hops() {
    init_test_logging();
    let mut config = Config::default_config();
    config.simulation.seed = Some(5);
    config.mesh.topology = Some(island_topology());
    let console = MeshConsole::new(&config).unwrap();

    let outcome = console.submit(&MeshCommand::OptimizeRoutes).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("ISLAND"));
    match &outcome.effect {
        CommandEffect::RoutesOptimized { report } => {
            assert_eq!(report.gateway, "GW");
            assert_eq!(report.unreachable, vec!["ISLAND".to_string()]);
            assert_eq!(report.changed_count(), 2);
        }
        other => panic!("unexpected effect {other:?}"),
    }

    let hops: Vec<u32> = console.snapshot().nodes.iter().map(|n| n.hops()).collect();
    assert_eq!(hops, vec![0, 1, 2, 6]);
}

#[test]
fn test_island_threats() {
    let mut config = Config::default_config();
    config.simulation.seed = Some(6);
    config.mesh.topology = Some(island_topology());
    let console = MeshConsole::new(&config).unwrap();

    let locations: Vec<String> = console
        .snapshot()
        .threats
        .iter()
        .map(|t| t.location.clone())
        .collect();
    assert_eq!(locations, vec!["ISLAND", "EDGE", "RELAY<->EDGE"]);
}

#[test]
fn test_json_commands() {
    let console = reference_console(7);
    let command: MeshCommand =
        serde_json::from_str(r#"{"command":"SELECT_NODE","node_id":"NODE-004"}"#).unwrap();
    let outcome = console.submit(&command).unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["command"], "SELECT_NODE");
    assert_eq!(json["effect"]["effect"], "selected");
    assert_eq!(json["effect"]["node_id"], "NODE-004");
}
