//! Test: external cancellation aborts without corrupting folded state

use crate::helpers::*;
use atelier::execution::{ExecutionContext, PipelineRunner};
use atelier::workflows;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_cancel_before_start_issues_no_invocations() {
    let invoker = MockInvoker::new(budgeting_results());
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker.clone(), gate);

    ctx.cancellation_flag().store(true, Ordering::SeqCst);

    let runner = PipelineRunner::new();
    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(invoker.calls(), 0);
    assert_eq!(result.error.as_deref(), Some("run cancelled"));
    assert_eq!(result.details.as_ref().unwrap()["kind"], "cancelled");
}

#[tokio::test]
async fn test_cancel_during_gate_discards_the_decision() {
    let flag = Arc::new(AtomicBool::new(false));
    let invoker = MockInvoker::new(budgeting_results());
    let gate = Arc::new(CancellingGate { flag: flag.clone() });

    let ctx = ExecutionContext::new(invoker.clone(), gate)
        .with_run_id(Uuid::nil())
        .with_clock(FixedClock::new())
        .with_cancellation_flag(flag);

    let runner = PipelineRunner::new();
    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    // The gate approved, but the approval arrived after cancellation
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("run cancelled"));
    // The prefix ran; the suffix never did
    assert_eq!(invoker.calls(), 2);
}
