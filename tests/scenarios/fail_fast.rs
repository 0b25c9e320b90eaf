//! Test: failures abort the run immediately, wherever they occur

use crate::helpers::*;
use atelier::execution::PipelineRunner;
use atelier::workflows;
use serde_json::json;

#[tokio::test]
async fn test_first_step_failure_stops_the_run() {
    let invoker = MockInvoker::new(vec![
        json!({ "success": false, "error": "ticketing export unavailable" }),
        // Would be the expenses result; must never be requested
        json!({ "totalExpenses": 480000 }),
    ]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker.clone(), gate.clone());
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(invoker.calls(), 1);
    assert_eq!(gate.presented(), 0);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("ticketing export unavailable"));
    assert_eq!(result.details.as_ref().unwrap()["kind"], "step_failure");
    assert_eq!(result.details.as_ref().unwrap()["step"], "revenue");
}

#[tokio::test]
async fn test_late_step_failure_also_stops_the_run() {
    // The success flag is honoured on every step, not just the first
    let invoker = MockInvoker::new(vec![
        json!({ "totalRevenue": 520000 }),
        json!({ "totalExpenses": 480000 }),
        json!({ "success": false, "error": "allocation figures disputed" }),
        json!({ "narrative": "never reached" }),
    ]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker.clone(), gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(invoker.calls(), 3);
    assert_eq!(result.details.as_ref().unwrap()["step"], "allocation");
}

#[tokio::test]
async fn test_schema_violation_aborts() {
    let invoker = MockInvoker::new(vec![
        // totalRevenue must be a number
        json!({ "totalRevenue": "five hundred twenty thousand" }),
    ]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker.clone(), gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(invoker.calls(), 1);
    assert_eq!(result.details.as_ref().unwrap()["kind"], "schema_violation");
    assert!(result.error.as_deref().unwrap().contains("totalRevenue"));
}

#[tokio::test]
async fn test_invocation_failure_aborts() {
    // An empty script makes the very first invocation fail
    let invoker = MockInvoker::new(vec![]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker, gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(
        result.details.as_ref().unwrap()["kind"],
        "invocation_failure"
    );
    // Accumulated state is discarded on abort
    assert!(result.artifacts.is_empty());
    assert!(result.payload.is_null());
}
