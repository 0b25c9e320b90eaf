//! Exhibition development workflow: concept, checklist, interpretation, schedule

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionConfig {
    pub working_title: String,
    pub opening_season: String,

    #[serde(default = "default_target_object_count")]
    pub target_object_count: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_target_object_count() -> u64 {
    60
}

fn concept_step() -> TaskDefinition {
    TaskDefinition::agent(
        "concept",
        "exhibitions curator",
        SchemaContract::new()
            .field("thesis", FieldKind::String)
            .field("themes", FieldKind::Array),
        |args| {
            format!(
                "Draft the concept brief for \"{title}\", opening {season}.\n\
                 One-paragraph thesis, three to five thematic sections, and \
                 the visitor takeaway. Write the brief to concept.md in {out}.",
                title = args["workingTitle"].as_str().unwrap_or("?"),
                season = args["openingSeason"].as_str().unwrap_or("?"),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn checklist_step() -> TaskDefinition {
    TaskDefinition::agent(
        "checklist",
        "exhibitions curator",
        SchemaContract::new()
            .field("objects", FieldKind::Array)
            .field("objectCount", FieldKind::Number)
            .field("loanCount", FieldKind::Number),
        |args| {
            format!(
                "Build the draft object checklist against the themes: {themes}.\n\
                 Target around {target} objects. For each: title, collection \
                 or lender, display needs, and theme. Count incoming loans \
                 separately.",
                themes = args["themes"].to_string(),
                target = args["targetObjectCount"],
            )
        },
    )
}

fn interpretation_step() -> TaskDefinition {
    TaskDefinition::agent(
        "interpretation",
        "interpretation manager",
        SchemaContract::new()
            .field("layers", FieldKind::Array)
            .optional("wordBudget", FieldKind::Number),
        |args| {
            format!(
                "Plan interpretation for \"{title}\": panel hierarchy, label \
                 word budgets, digital layers, and access provision, keyed \
                 to the checklist of {count} objects.",
                title = args["workingTitle"].as_str().unwrap_or("?"),
                count = args["objectCount"],
            )
        },
    )
}

fn schedule_step() -> TaskDefinition {
    TaskDefinition::agent(
        "schedule",
        "exhibitions registrar",
        SchemaContract::new().field("milestones", FieldKind::Array),
        |args| {
            format!(
                "Draft the production schedule back from the {season} \
                 opening: loan requests, design freeze, build, object \
                 installation, and sign-off, with owners. {loans} incoming \
                 loans drive the critical path.",
                season = args["openingSeason"].as_str().unwrap_or("?"),
                loans = args["loanCount"],
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("exhibition")
        .step(concept_step(), |state| state.config().clone())
        .step(checklist_step(), |state| {
            json!({
                "themes": state.field("concept", "themes"),
                "targetObjectCount": state.config()["targetObjectCount"],
            })
        })
        .step(interpretation_step(), |state| {
            json!({
                "workingTitle": state.config()["workingTitle"],
                "objectCount": state.field("checklist", "objectCount"),
            })
        })
        .gate_after(3, |state| {
            let objects = state.number("checklist", "objectCount").unwrap_or(0.0) as u64;
            let loans = state.number("checklist", "loanCount").unwrap_or(0.0) as u64;
            let target = state.config()["targetObjectCount"].as_u64().unwrap_or(0);
            GatePrompt {
                title: format!(
                    "Checklist review: {}",
                    state.config()["workingTitle"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "The draft checklist carries {} objects ({} incoming \
                     loans) against a target of {}. Approve for production \
                     scheduling?",
                    objects, loans, target
                ),
                summary: json!({
                    "objectCount": objects,
                    "loanCount": loans,
                    "targetObjectCount": target,
                }),
            }
        })
        .step(schedule_step(), |state| {
            json!({
                "openingSeason": state.config()["openingSeason"],
                "loanCount": state.field("checklist", "loanCount"),
            })
        })
        .finish(|state| {
            json!({
                "workingTitle": state.config()["workingTitle"],
                "openingSeason": state.config()["openingSeason"],
                "thesis": state.field("concept", "thesis"),
                "objectCount": state.number("checklist", "objectCount"),
                "loanCount": state.number("checklist", "loanCount"),
                "milestones": state.field("schedule", "milestones"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: ExhibitionConfig = serde_json::from_value(config)?;
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
        assert_eq!(
            names,
            vec!["concept", "checklist", "interpretation", "schedule"]
        );
        assert_eq!(pipeline.gate().unwrap().after(), 3);
    }

    #[test]
    fn test_target_count_defaults() {
        let config: ExhibitionConfig = serde_json::from_value(json!({
            "workingTitle": "Clay Bodies",
            "openingSeason": "spring 2027",
        }))
        .unwrap();
        assert_eq!(config.target_object_count, 60);
    }
}
