//! Event planning workflow: concept, logistics, costing, run-of-show

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{amount, default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsConfig {
    pub event_name: String,
    pub expected_attendance: f64,
    pub budget_ceiling: f64,

    #[serde(default = "default_venue")]
    pub venue: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_venue() -> String {
    "main galleries".to_string()
}

fn concept_step() -> TaskDefinition {
    TaskDefinition::agent(
        "concept",
        "public programs producer",
        SchemaContract::new()
            .field("concept", FieldKind::String)
            .field("targetAudience", FieldKind::String),
        |args| {
            format!(
                "Develop the concept brief for \"{name}\" in the {venue}, \
                 expecting around {attendance} visitors.\n\
                 Cover the premise, the target audience, the arc of the \
                 evening, and how it connects to the current program. Write \
                 the brief to concept.md in {out}.",
                name = args["eventName"].as_str().unwrap_or("?"),
                venue = args["venue"].as_str().unwrap_or("main galleries"),
                attendance = amount(args["expectedAttendance"].as_f64().unwrap_or(0.0)),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn logistics_step() -> TaskDefinition {
    TaskDefinition::agent(
        "logistics",
        "public programs producer",
        SchemaContract::new()
            .field("staffing", FieldKind::Array)
            .field("requirements", FieldKind::Array),
        |args| {
            format!(
                "Plan logistics for \"{name}\" ({attendance} expected) per \
                 the concept: {concept}\n\
                 Staffing by role and shift, security and invigilation, \
                 AV and power, catering zones away from objects, accessible \
                 routes, and wet-weather fallback.",
                name = args["eventName"].as_str().unwrap_or("?"),
                attendance = amount(args["expectedAttendance"].as_f64().unwrap_or(0.0)),
                concept = args["concept"].as_str().unwrap_or(""),
            )
        },
    )
}

fn costing_step() -> TaskDefinition {
    TaskDefinition::agent(
        "costing",
        "public programs producer",
        SchemaContract::new()
            .field("estimatedCost", FieldKind::Number)
            .field("lineItems", FieldKind::Array),
        |args| {
            format!(
                "Cost the event from the logistics plan: {requirements}.\n\
                 Line items with supplier assumptions; include staffing from \
                 the plan and a 10% contingency. The approved ceiling is {ceiling}.",
                requirements = args["requirements"].to_string(),
                ceiling = amount(args["budgetCeiling"].as_f64().unwrap_or(0.0)),
            )
        },
    )
}

fn runbook_step() -> TaskDefinition {
    TaskDefinition::agent(
        "runbook",
        "public programs producer",
        SchemaContract::new().field("runOfShow", FieldKind::Array),
        |args| {
            format!(
                "Write the run-of-show for \"{name}\": timed cues from \
                 load-in to lock-up, owner per cue, and the contact sheet \
                 placeholders. Staffing: {staffing}",
                name = args["eventName"].as_str().unwrap_or("?"),
                staffing = args["staffing"].to_string(),
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("events")
        .step(concept_step(), |state| state.config().clone())
        .step(logistics_step(), |state| {
            json!({
                "eventName": state.config()["eventName"],
                "expectedAttendance": state.config()["expectedAttendance"],
                "concept": state.field("concept", "concept"),
            })
        })
        .step(costing_step(), |state| {
            json!({
                "budgetCeiling": state.config()["budgetCeiling"],
                "requirements": state.field("logistics", "requirements"),
            })
        })
        .gate_after(3, |state| {
            let cost = state.number("costing", "estimatedCost").unwrap_or(0.0);
            let ceiling = state.config()["budgetCeiling"].as_f64().unwrap_or(0.0);
            let margin = ceiling - cost;
            let position = if margin >= 0.0 {
                format!("{} under the ceiling", amount(margin))
            } else {
                format!("{} over the ceiling", amount(-margin))
            };
            GatePrompt {
                title: format!(
                    "Cost approval: {}",
                    state.config()["eventName"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "The estimate came in at {}, {} of {}. Approve and \
                     continue to the run-of-show?",
                    amount(cost),
                    position,
                    amount(ceiling)
                ),
                summary: json!({
                    "estimatedCost": cost,
                    "budgetCeiling": ceiling,
                    "margin": margin,
                }),
            }
        })
        .step(runbook_step(), |state| {
            json!({
                "eventName": state.config()["eventName"],
                "staffing": state.field("logistics", "staffing"),
            })
        })
        .finish(|state| {
            json!({
                "eventName": state.config()["eventName"],
                "estimatedCost": state.number("costing", "estimatedCost"),
                "budgetCeiling": state.config()["budgetCeiling"],
                "runOfShow": state.field("runbook", "runOfShow"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: EventsConfig = serde_json::from_value(config)?;
    let effective = serde_json::to_value(&config)?;
    Ok(runner.run(&pipeline()?, effective, ctx).await)
}
