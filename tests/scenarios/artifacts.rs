//! Test: artifact ledger ordering, duplicates, and defaults end to end

use crate::helpers::*;
use atelier::execution::PipelineRunner;
use atelier::workflows;
use serde_json::json;

#[tokio::test]
async fn test_ledger_preserves_order_and_duplicates() {
    // Conservation: intake, condition, (gate), treatment, summary.
    // Two steps deliberately contribute the same path.
    let invoker = MockInvoker::new(vec![
        json!({
            "objectDescription": "tin-glazed earthenware charger",
            "materials": ["earthenware", "tin glaze"],
            "artifacts": [{ "path": "intake.md" }]
        }),
        json!({
            "issues": [{ "location": "rim", "severity": "minor" }],
            "severityScore": 3,
            "artifacts": [
                { "path": "condition.md" },
                { "path": "photos/rim.jpg", "format": "jpeg" }
            ]
        }),
        json!({
            "actions": ["consolidate rim glaze"],
            "estimatedHours": 6,
            "artifacts": [{ "path": "condition.md" }]
        }),
        json!({
            "report": "Treated and stable.",
            "artifacts": [{ "path": "summary.md" }]
        }),
    ]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker, gate.clone());
    let runner = PipelineRunner::new();

    let config = json!({
        "accessionNumber": "1987.412",
        "objectName": "tin-glazed charger",
    });
    let result = workflows::run(&runner, "conservation", config, &ctx)
        .await
        .unwrap();

    assert!(result.success);

    let paths: Vec<&str> = result.artifacts.iter().map(|a| a.path.as_str()).collect();
    // condition.md appears twice, in contribution order, never deduplicated
    assert_eq!(
        paths,
        vec![
            "intake.md",
            "condition.md",
            "photos/rim.jpg",
            "condition.md",
            "summary.md"
        ]
    );

    // Explicit formats survive; omitted ones default
    assert_eq!(result.artifacts[2].format, "jpeg");
    assert_eq!(result.artifacts[0].format, "markdown");

    // The gate saw only the prefix's artifacts
    let request = gate.request().unwrap();
    assert_eq!(request.context.files.len(), 3);
}

#[tokio::test]
async fn test_steps_without_artifacts_leave_ledger_unchanged() {
    let invoker = MockInvoker::new(vec![
        json!({ "totalRevenue": 520000, "artifacts": [{ "path": "rev.md" }] }),
        json!({ "totalExpenses": 480000 }),
        json!({ "allocations": [] }),
        json!({ "narrative": "thin year for paperwork" }),
    ]);
    let gate = RecordingGate::approve();
    let ctx = fixed_context(invoker, gate);
    let runner = PipelineRunner::new();

    let result = workflows::run(&runner, "budgeting", budgeting_config(), &ctx)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.artifacts.len(), 1);
    assert_eq!(result.artifacts[0].path, "rev.md");
}
