//! Visitor-experience workflow: audience research, journey map, proposal

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorConfig {
    /// Gallery or service area under study, e.g. "permanent collection, floor 2"
    pub site_area: String,

    #[serde(default = "default_focus_segment")]
    pub focus_segment: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_focus_segment() -> String {
    "family visitors".to_string()
}

fn research_step() -> TaskDefinition {
    TaskDefinition::agent(
        "research",
        "visitor experience designer",
        SchemaContract::new()
            .field("segments", FieldKind::Array)
            .field("keyFindings", FieldKind::Array),
        |args| {
            format!(
                "Synthesise audience research for {area}, focused on {segment}.\n\
                 Draw on exit surveys, dwell-time observation, and front-of-house \
                 logs. Profile the visiting segments and list key findings. \
                 Write the synthesis to research.md in {out}.",
                area = args["siteArea"].as_str().unwrap_or("?"),
                segment = args["focusSegment"].as_str().unwrap_or("?"),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn journey_step() -> TaskDefinition {
    TaskDefinition::agent(
        "journey",
        "visitor experience designer",
        SchemaContract::new()
            .field("touchpoints", FieldKind::Array)
            .field("painPoints", FieldKind::Array),
        |args| {
            format!(
                "Map the {segment} journey through {area}, from arrival to \
                 departure, using the findings: {findings}.\n\
                 Identify every touchpoint and mark the pain points with \
                 severity and evidence.",
                segment = args["focusSegment"].as_str().unwrap_or("?"),
                area = args["siteArea"].as_str().unwrap_or("?"),
                findings = args["keyFindings"].to_string(),
            )
        },
    )
}

fn proposal_step() -> TaskDefinition {
    TaskDefinition::agent(
        "proposal",
        "visitor experience designer",
        SchemaContract::new()
            .field("interventions", FieldKind::Array)
            .field("proposal", FieldKind::String),
        |args| {
            format!(
                "Write the experience proposal for {area}: one intervention \
                 per approved pain point, each with expected effect and a \
                 rough cost band. Pain points: {painPoints}",
                area = args["siteArea"].as_str().unwrap_or("?"),
                painPoints = args["painPoints"].to_string(),
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("visitor")
        .step(research_step(), |state| state.config().clone())
        .step(journey_step(), |state| {
            json!({
                "siteArea": state.config()["siteArea"],
                "focusSegment": state.config()["focusSegment"],
                "keyFindings": state.field("research", "keyFindings"),
            })
        })
        .gate_after(2, |state| {
            let touchpoints = state
                .field("journey", "touchpoints")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            let pain_points = state
                .field("journey", "painPoints")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            GatePrompt {
                title: format!(
                    "Journey review: {}",
                    state.config()["siteArea"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "Journey mapping for {} surfaced {} pain points across \
                     {} touchpoints. Approve this focus for the experience \
                     proposal?",
                    state.config()["focusSegment"].as_str().unwrap_or("?"),
                    pain_points,
                    touchpoints
                ),
                summary: json!({
                    "touchpointCount": touchpoints,
                    "painPointCount": pain_points,
                    "focusSegment": state.config()["focusSegment"],
                }),
            }
        })
        .step(proposal_step(), |state| {
            json!({
                "siteArea": state.config()["siteArea"],
                "painPoints": state.field("journey", "painPoints"),
            })
        })
        .finish(|state| {
            json!({
                "siteArea": state.config()["siteArea"],
                "focusSegment": state.config()["focusSegment"],
                "painPointCount": state
                    .field("journey", "painPoints")
                    .and_then(Value::as_array)
                    .map(Vec::len),
                "interventions": state.field("proposal", "interventions"),
                "proposal": state.field("proposal", "proposal"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: VisitorConfig = serde_json::from_value(config)?;
    let effective = serde_json::to_value(&config)?;
    Ok(runner.run(&pipeline()?, effective, ctx).await)
}
