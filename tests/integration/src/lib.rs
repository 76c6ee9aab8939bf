//! Cross-crate scenarios for the TacMesh dashboard
//!
//! This test suite validates:
//! - Seed topology loading through configuration
//! - Operator command flows end to end through the console
//! - Telemetry ticks running alongside commands on the shared state lock

pub mod test_utils;

#[cfg(test)]
mod command_flow_tests;

#[cfg(test)]
mod telemetry_runtime_tests;
