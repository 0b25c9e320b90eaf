//! Curatorial research workflow: object history, provenance, catalogue entry

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{amount, default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratorialConfig {
    pub object_title: String,

    #[serde(default = "default_attribution")]
    pub attribution: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_attribution() -> String {
    "unattributed".to_string()
}

fn history_step() -> TaskDefinition {
    TaskDefinition::agent(
        "history",
        "curator of collections",
        SchemaContract::new()
            .field("timeline", FieldKind::Array)
            .optional("exhibitionHistory", FieldKind::Array),
        |args| {
            format!(
                "Assemble the object history for \"{title}\" (currently {attribution}).\n\
                 Build a dated timeline from acquisition records, conservation \
                 files, loan records, and published mentions. Note conflicting \
                 dates rather than resolving them. Write to history.md in {out}.",
                title = args["objectTitle"].as_str().unwrap_or("?"),
                attribution = args["attribution"].as_str().unwrap_or("unattributed"),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn provenance_step() -> TaskDefinition {
    TaskDefinition::agent(
        "provenance",
        "provenance researcher",
        SchemaContract::new()
            .field("chain", FieldKind::Array)
            .field("gaps", FieldKind::Array)
            .field("confidence", FieldKind::Number),
        |args| {
            format!(
                "Research the provenance of \"{title}\" using the assembled \
                 timeline: {timeline}.\n\
                 Reconstruct the chain of ownership, list every unresolved \
                 gap (especially 1933-1945), and state your confidence in \
                 the current attribution from 0 to 1.",
                title = args["objectTitle"].as_str().unwrap_or("?"),
                timeline = args["timeline"].to_string(),
            )
        },
    )
}

fn catalogue_step() -> TaskDefinition {
    TaskDefinition::agent(
        "catalogue",
        "curator of collections",
        SchemaContract::new().field("entry", FieldKind::String),
        |args| {
            format!(
                "Write the catalogue entry for \"{title}\": attribution as \
                 approved, materials, dimensions placeholder, provenance \
                 paragraph from the researched chain, and selected \
                 literature. Scholarly register, no speculation beyond the \
                 stated confidence.\nChain: {chain}",
                title = args["objectTitle"].as_str().unwrap_or("?"),
                chain = args["chain"].to_string(),
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("curatorial")
        .step(history_step(), |state| state.config().clone())
        .step(provenance_step(), |state| {
            json!({
                "objectTitle": state.config()["objectTitle"],
                "timeline": state.field("history", "timeline"),
            })
        })
        .gate_after(2, |state| {
            let confidence = state.number("provenance", "confidence").unwrap_or(0.0);
            let gaps = state
                .field("provenance", "gaps")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            GatePrompt {
                title: format!(
                    "Attribution review: {}",
                    state.config()["objectTitle"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "Provenance research reached {}% confidence in the \
                     attribution with {} unresolved gaps. Approve for the \
                     published catalogue entry?",
                    amount(confidence * 100.0),
                    gaps
                ),
                summary: json!({
                    "confidence": confidence,
                    "gapCount": gaps,
                    "attribution": state.config()["attribution"],
                }),
            }
        })
        .step(catalogue_step(), |state| {
            json!({
                "objectTitle": state.config()["objectTitle"],
                "chain": state.field("provenance", "chain"),
            })
        })
        .finish(|state| {
            json!({
                "objectTitle": state.config()["objectTitle"],
                "attribution": state.config()["attribution"],
                "confidence": state.number("provenance", "confidence"),
                "entry": state.field("catalogue", "entry"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: CuratorialConfig = serde_json::from_value(config)?;
    let effective = serde_json::to_value(&config)?;
    Ok(runner.run(&pipeline()?, effective, ctx).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_shape() {
        let pipeline = pipeline().unwrap();
        let names: Vec<&str> = pipeline.steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["history", "provenance", "catalogue"]);
        assert_eq!(pipeline.gate().unwrap().after(), 2);
    }

    #[test]
    fn test_attribution_defaults() {
        let config: CuratorialConfig =
            serde_json::from_value(json!({ "objectTitle": "Still Life with Quinces" })).unwrap();
        assert_eq!(config.attribution, "unattributed");
    }
}
