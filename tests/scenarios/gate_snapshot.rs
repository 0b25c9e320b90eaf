//! Test: the breakpoint request snapshots state exactly as accumulated

use crate::helpers::*;
use atelier::core::ResumeDecision;
use atelier::execution::PipelineRunner;
use atelier::workflows;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_budgeting_gate_embeds_computed_surplus() {
    let invoker = MockInvoker::new(vec![
        json!({
            "success": true,
            "totalRevenue": 520000,
            "artifacts": [{ "path": "rev.md" }]
        }),
        json!({
            "totalExpenses": 480000,
            "artifacts": [{ "path": "exp.md" }]
        }),
    ]);
    // Reject so the run stops right after the gate; the snapshot is the point
    let gate = RecordingGate::new(ResumeDecision::Reject {
        reason: "figures need a second pass".to_string(),
    });
    let ctx = fixed_context(invoker, gate.clone());
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();
    assert!(!result.success);

    let request = gate.request().expect("run never reached the gate");

    // 520000 - 480000, quoted as a whole number
    assert!(request.question.contains("40000"), "question was: {}", request.question);
    assert!(request.question.contains("surplus"));
    assert_eq!(request.title, "FY2025 budget review");

    // The files view is the ledger strictly before the gate, defaulted format
    let paths: Vec<&str> = request.context.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["rev.md", "exp.md"]);
    for file in &request.context.files {
        assert_eq!(file.format, "markdown");
    }

    assert_eq!(request.context.run_id, Uuid::nil());
    assert_eq!(request.context.summary["totalRevenue"], 520000.0);
    assert_eq!(request.context.summary["totalExpenses"], 480000.0);
    assert_eq!(request.context.summary["surplus"], 40000.0);
}

#[tokio::test]
async fn test_deficit_phrasing_at_the_gate() {
    let invoker = MockInvoker::new(vec![
        json!({ "totalRevenue": 450000 }),
        json!({ "totalExpenses": 480000 }),
    ]);
    let gate = RecordingGate::new(ResumeDecision::Reject {
        reason: "stop here".to_string(),
    });
    let ctx = fixed_context(invoker, gate.clone());
    let runner = PipelineRunner::new();

    workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    let request = gate.request().unwrap();
    assert!(request.question.contains("deficit"));
    assert!(request.question.contains("30000"));
}
