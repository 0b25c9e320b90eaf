//! Loan agreement workflow: request review, requirements, agreement draft

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{amount, default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoansConfig {
    pub object_title: String,
    pub borrower: String,
    pub loan_period: String,
    pub insurance_value: f64,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn review_step() -> TaskDefinition {
    TaskDefinition::agent(
        "review",
        "registrar",
        SchemaContract::new()
            .field("riskFactors", FieldKind::Array)
            .field("recommendation", FieldKind::String),
        |args| {
            format!(
                "Review the incoming loan request: \"{title}\" to {borrower} \
                 for {period}, insured at {value}.\n\
                 Assess borrower facilities, transit risk, display duration, \
                 and the object's condition and loan history. List risk \
                 factors and recommend proceed, decline, or conditions. \
                 Write the review to review.md in {out}.",
                title = args["objectTitle"].as_str().unwrap_or("?"),
                borrower = args["borrower"].as_str().unwrap_or("?"),
                period = args["loanPeriod"].as_str().unwrap_or("?"),
                value = amount(args["insuranceValue"].as_f64().unwrap_or(0.0)),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn requirements_step() -> TaskDefinition {
    TaskDefinition::agent(
        "requirements",
        "registrar",
        SchemaContract::new()
            .field("requirements", FieldKind::Array)
            .field("courierRequired", FieldKind::Boolean),
        |args| {
            format!(
                "Set the lending conditions given these risk factors: {risks}.\n\
                 Environmental bands, case and mount requirements, transit \
                 packing, photography and credit terms, and whether a \
                 courier accompanies the object.",
                risks = args["riskFactors"].to_string(),
            )
        },
    )
}

fn agreement_step() -> TaskDefinition {
    TaskDefinition::agent(
        "agreement",
        "registrar",
        SchemaContract::new().field("draft", FieldKind::String),
        |args| {
            format!(
                "Draft the loan agreement for \"{title}\" to {borrower}, \
                 period {period}, insurance value {value}, incorporating \
                 the approved conditions: {requirements}.\n\
                 Standard clauses plus the conditions as schedules.",
                title = args["objectTitle"].as_str().unwrap_or("?"),
                borrower = args["borrower"].as_str().unwrap_or("?"),
                period = args["loanPeriod"].as_str().unwrap_or("?"),
                value = amount(args["insuranceValue"].as_f64().unwrap_or(0.0)),
                requirements = args["requirements"].to_string(),
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("loans")
        .step(review_step(), |state| state.config().clone())
        .step(requirements_step(), |state| {
            json!({ "riskFactors": state.field("review", "riskFactors") })
        })
        .gate_after(2, |state| {
            let risks = state
                .field("review", "riskFactors")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            let courier = state
                .field("requirements", "courierRequired")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            GatePrompt {
                title: format!(
                    "Lending terms: {}",
                    state.config()["objectTitle"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "Loan to {} insured at {}: {} risk factors noted, courier \
                     {}. Approve the lending terms and draft the agreement?",
                    state.config()["borrower"].as_str().unwrap_or("?"),
                    amount(state.config()["insuranceValue"].as_f64().unwrap_or(0.0)),
                    risks,
                    if courier { "required" } else { "not required" },
                ),
                summary: json!({
                    "riskFactorCount": risks,
                    "courierRequired": courier,
                    "recommendation": state.field("review", "recommendation"),
                }),
            }
        })
        .step(agreement_step(), |state| {
            json!({
                "objectTitle": state.config()["objectTitle"],
                "borrower": state.config()["borrower"],
                "loanPeriod": state.config()["loanPeriod"],
                "insuranceValue": state.config()["insuranceValue"],
                "requirements": state.field("requirements", "requirements"),
            })
        })
        .finish(|state| {
            json!({
                "objectTitle": state.config()["objectTitle"],
                "borrower": state.config()["borrower"],
                "recommendation": state.field("review", "recommendation"),
                "courierRequired": state.field("requirements", "courierRequired"),
                "draft": state.field("agreement", "draft"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: LoansConfig = serde_json::from_value(config)?;
    let effective = serde_json::to_value(&config)?;
    Ok(runner.run(&pipeline()?, effective, ctx).await)
}
