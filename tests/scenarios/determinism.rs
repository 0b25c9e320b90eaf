//! Test: identical configuration and pure stubs give identical results

use crate::helpers::*;
use atelier::execution::PipelineRunner;
use atelier::workflows;

#[tokio::test]
async fn test_two_runs_serialise_identically() {
    let mut serialised = Vec::new();

    for _ in 0..2 {
        let invoker = MockInvoker::new(budgeting_results());
        let gate = RecordingGate::approve();
        let ctx = fixed_context(invoker, gate);
        let runner = PipelineRunner::new();

        let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
            .await
            .unwrap();
        serialised.push(serde_json::to_string(&result).unwrap());
    }

    assert_eq!(serialised[0], serialised[1]);
}

#[tokio::test]
async fn test_duration_matches_metadata_timestamps() {
    let invoker = MockInvoker::new(budgeting_results());
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker, gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    let span = result.metadata.finished_at - result.metadata.started_at;
    assert_eq!(result.duration_ms, span.num_milliseconds());
    assert!(result.duration_ms >= 0);

    // The fixed clock ticks once at start and once at finish
    assert_eq!(result.duration_ms, 1_000);
}
