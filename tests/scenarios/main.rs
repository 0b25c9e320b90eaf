//! Scenario-based tests for atelier

mod helpers;

mod artifacts;
mod cancellation;
mod determinism;
mod fail_fast;
mod gate_decisions;
mod gate_snapshot;
mod success_chain;
