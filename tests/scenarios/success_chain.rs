//! Test: full budgeting run with approval at the gate

use crate::helpers::*;
use atelier::execution::PipelineRunner;
use atelier::workflows;

#[tokio::test]
async fn test_budgeting_run_completes() {
    let invoker = MockInvoker::new(budgeting_results());
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker.clone(), gate.clone());
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(invoker.calls(), 4);
    assert_eq!(gate.presented(), 1);

    // Domain payload carries the computed figures
    assert_eq!(result.payload["fiscalYear"], "2025");
    assert_eq!(result.payload["totalRevenue"], 520000.0);
    assert_eq!(result.payload["totalExpenses"], 480000.0);
    assert_eq!(result.payload["surplus"], 40000.0);
    assert_eq!(result.payload["narrative"], "A modest surplus year.");

    // Terminal ledger view, in contribution order
    let paths: Vec<&str> = result.artifacts.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(paths, vec!["rev.md", "exp.md", "alloc.md", "narrative.md"]);

    // Metadata echoes the effective configuration, defaults applied
    assert_eq!(result.metadata.workflow, "budgeting");
    assert_eq!(result.metadata.config["fiscalYear"], "2025");
    assert_eq!(result.metadata.config["outputDir"], "./workspace");
    assert_eq!(result.metadata.config["reportingCadence"], "quarterly");
}

#[tokio::test]
async fn test_artifact_formats_default_in_result() {
    let invoker = MockInvoker::new(budgeting_results());
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker, gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    // All four steps' artifacts carry a format in the view; the ones that
    // omitted it defaulted to markdown
    for artifact in &result.artifacts {
        assert_eq!(artifact.format, "markdown");
    }
}

#[tokio::test]
async fn test_unknown_workflow_errors() {
    let invoker = MockInvoker::new(vec![]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker, gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "taxidermy", budgeting_config(), &ctx).await;
    assert!(result.is_err());
}
