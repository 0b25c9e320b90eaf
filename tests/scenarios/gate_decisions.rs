//! Test: reviewer decisions - reject aborts, modify patches and resumes

use crate::helpers::*;
use atelier::core::ResumeDecision;
use atelier::execution::PipelineRunner;
use atelier::workflows;
use serde_json::json;

#[tokio::test]
async fn test_reject_aborts_with_reason() {
    let invoker = MockInvoker::new(budgeting_results());
    let gate = RecordingGate::new(ResumeDecision::Reject {
        reason: "allocation exceeds the board-approved ceiling".to_string(),
    });
    let ctx = fixed_context(invoker.clone(), gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(!result.success);
    // The suffix after the gate never runs
    assert_eq!(invoker.calls(), 2);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("allocation exceeds the board-approved ceiling"));
    assert_eq!(
        result.details.as_ref().unwrap()["kind"],
        "breakpoint_rejection"
    );
}

#[tokio::test]
async fn test_modify_patches_config_and_resumes() {
    let invoker = MockInvoker::new(budgeting_results());
    let gate = RecordingGate::new(ResumeDecision::Modify {
        patch: json!({ "annualBudget": 475000, "reportingCadence": "monthly" }),
    });
    let ctx = fixed_context(invoker.clone(), gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    // The run resumes and completes
    assert!(result.success);
    assert_eq!(invoker.calls(), 4);

    // The echoed configuration reflects the reviewer's edit
    assert_eq!(result.metadata.config["annualBudget"], 475000);
    assert_eq!(result.metadata.config["reportingCadence"], "monthly");
    // Untouched fields survive the merge
    assert_eq!(result.metadata.config["fiscalYear"], "2025");

    // Already-folded step results are untouched by the patch
    assert_eq!(result.payload["totalRevenue"], 520000.0);
}
