//! Conservation workflow: intake, condition survey, treatment

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{amount, default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConservationConfig {
    pub accession_number: String,
    pub object_name: String,

    /// Whether the treatment must meet outgoing-loan condition standards
    #[serde(default)]
    pub loan_bound: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn intake_step() -> TaskDefinition {
    TaskDefinition::agent(
        "intake",
        "objects conservator",
        SchemaContract::new()
            .field("objectDescription", FieldKind::String)
            .field("materials", FieldKind::Array),
        |args| {
            format!(
                "Carry out the intake survey for {name} ({accession}).\n\
                 Describe the object, identify its materials and techniques, \
                 and note any previous treatment visible on examination. \
                 Write the survey to intake.md in {out}.",
                name = args["objectName"].as_str().unwrap_or("?"),
                accession = args["accessionNumber"].as_str().unwrap_or("?"),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn condition_step() -> TaskDefinition {
    TaskDefinition::agent(
        "condition",
        "objects conservator",
        SchemaContract::new()
            .field("issues", FieldKind::Array)
            .field("severityScore", FieldKind::Number),
        |args| {
            format!(
                "Write the condition report for {name}, materials: {materials}.\n\
                 List every condition issue with location and severity, and \
                 give an overall severity score from 0 (pristine) to 10 \
                 (unexhibitable). Photograph references go in condition.md.",
                name = args["objectName"].as_str().unwrap_or("?"),
                materials = args["materials"].to_string(),
            )
        },
    )
}

fn treatment_step() -> TaskDefinition {
    TaskDefinition::agent(
        "treatment",
        "objects conservator",
        SchemaContract::new()
            .field("actions", FieldKind::Array)
            .field("estimatedHours", FieldKind::Number),
        |args| {
            let standard = if args["loanBound"].as_bool().unwrap_or(false) {
                "The object travels on loan afterwards; treat to courier-grade stability."
            } else {
                "Treat to display-grade stability."
            };
            format!(
                "Propose the treatment plan for the approved scope.\n\
                 Issues under treatment: {issues}.\n{standard}\n\
                 List each action with materials and estimated bench hours.",
                issues = args["issues"].to_string(),
                standard = standard,
            )
        },
    )
}

fn summary_step() -> TaskDefinition {
    TaskDefinition::agent(
        "summary",
        "objects conservator",
        SchemaContract::new().field("report", FieldKind::String),
        |args| {
            format!(
                "Write the treatment summary for {name} ({accession}) for \
                 the object file: condition found, actions taken, materials \
                 used, and recommendations for display and storage.",
                name = args["objectName"].as_str().unwrap_or("?"),
                accession = args["accessionNumber"].as_str().unwrap_or("?"),
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("conservation")
        .step(intake_step(), |state| state.config().clone())
        .step(condition_step(), |state| {
            json!({
                "objectName": state.config()["objectName"],
                "materials": state.field("intake", "materials"),
            })
        })
        .gate_after(2, |state| {
            let issues = state
                .field("condition", "issues")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            let severity = state.number("condition", "severityScore").unwrap_or(0.0);
            GatePrompt {
                title: format!(
                    "Treatment scope: {}",
                    state.config()["objectName"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "The condition survey found {} issues with an overall \
                     severity of {}/10. Approve the proposed treatment scope?",
                    issues,
                    amount(severity)
                ),
                summary: json!({
                    "issueCount": issues,
                    "severityScore": severity,
                    "loanBound": state.config()["loanBound"],
                }),
            }
        })
        .step(treatment_step(), |state| {
            json!({
                "issues": state.field("condition", "issues"),
                "loanBound": state.config()["loanBound"],
            })
        })
        .step(summary_step(), |state| {
            json!({
                "objectName": state.config()["objectName"],
                "accessionNumber": state.config()["accessionNumber"],
            })
        })
        .finish(|state| {
            json!({
                "accessionNumber": state.config()["accessionNumber"],
                "objectName": state.config()["objectName"],
                "severityScore": state.number("condition", "severityScore"),
                "estimatedHours": state.number("treatment", "estimatedHours"),
                "report": state.field("summary", "report"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: ConservationConfig = serde_json::from_value(config)?;
    let effective = serde_json::to_value(&config)?;
    Ok(runner.run(&pipeline()?, effective, ctx).await)
}
