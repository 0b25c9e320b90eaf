//! Annual budgeting workflow
//!
//! Projects revenue, reviews expenses, pauses for finance-committee
//! approval on the computed surplus or deficit, then produces the
//! allocation plan and the budget narrative.

use crate::core::{FieldKind, GatePrompt, Pipeline, PipelineError, ProcessResult, SchemaContract, TaskDefinition};
use crate::execution::{ExecutionContext, PipelineRunner};
use crate::workflows::{amount, default_output_dir, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetingConfig {
    /// Fiscal year under budget, e.g. "2025"
    pub fiscal_year: String,

    /// Board-approved spending ceiling
    pub annual_budget: f64,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_reporting_cadence")]
    pub reporting_cadence: String,
}

fn default_reporting_cadence() -> String {
    "quarterly".to_string()
}

fn revenue_step() -> TaskDefinition {
    TaskDefinition::agent(
        "revenue",
        "museum finance director",
        SchemaContract::new()
            .field("totalRevenue", FieldKind::Number)
            .optional("lines", FieldKind::Array)
            .optional("assumptions", FieldKind::String),
        |args| {
            format!(
                "Project total operating revenue for fiscal year {fy}.\n\
                 Work line by line: admissions, memberships, grants and \
                 contributed income, retail and venue hire, endowment draw.\n\
                 The board-approved budget ceiling is {budget}. State your \
                 assumptions, and write the projection to rev.md in {out}.",
                fy = args["fiscalYear"].as_str().unwrap_or("?"),
                budget = amount(args["annualBudget"].as_f64().unwrap_or(0.0)),
                out = args["outputDir"].as_str().unwrap_or("./workspace"),
            )
        },
    )
}

fn expenses_step() -> TaskDefinition {
    TaskDefinition::agent(
        "expenses",
        "museum finance director",
        SchemaContract::new()
            .field("totalExpenses", FieldKind::Number)
            .optional("lines", FieldKind::Array),
        |args| {
            format!(
                "Review projected operating expenses for fiscal year {fy} \
                 against projected revenue of {revenue}.\n\
                 Cover salaries and benefits, facilities, exhibitions and \
                 programs, collections care, marketing, and administration.\n\
                 Flag any line growing faster than 5% year on year. Write \
                 the review to exp.md.",
                fy = args["fiscalYear"].as_str().unwrap_or("?"),
                revenue = amount(args["totalRevenue"].as_f64().unwrap_or(0.0)),
            )
        },
    )
}

fn allocation_step() -> TaskDefinition {
    TaskDefinition::agent(
        "allocation",
        "museum finance director",
        SchemaContract::new()
            .field("allocations", FieldKind::Array)
            .optional("contingency", FieldKind::Number),
        |args| {
            format!(
                "Draft the departmental allocation plan for fiscal year {fy}.\n\
                 Projected revenue {revenue}, projected expenses {expenses}, \
                 leaving {headroom} to allocate or absorb.\n\
                 Allocate by department with a one-line rationale each, and \
                 hold a contingency of at least 2% of revenue.",
                fy = args["fiscalYear"].as_str().unwrap_or("?"),
                revenue = amount(args["totalRevenue"].as_f64().unwrap_or(0.0)),
                expenses = amount(args["totalExpenses"].as_f64().unwrap_or(0.0)),
                headroom = amount(args["surplus"].as_f64().unwrap_or(0.0)),
            )
        },
    )
}

fn narrative_step() -> TaskDefinition {
    TaskDefinition::agent(
        "narrative",
        "museum finance director",
        SchemaContract::new().field("narrative", FieldKind::String),
        |args| {
            format!(
                "Write the budget narrative for the fiscal year {fy} board \
                 pack: a plain-language summary of the revenue picture, the \
                 expense position, and the allocation plan, reported on a \
                 {cadence} cadence. Keep it under two pages.",
                fy = args["fiscalYear"].as_str().unwrap_or("?"),
                cadence = args["reportingCadence"].as_str().unwrap_or("quarterly"),
            )
        },
    )
}

pub fn pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder("budgeting")
        .step(revenue_step(), |state| state.config().clone())
        .step(expenses_step(), |state| {
            json!({
                "fiscalYear": state.config()["fiscalYear"],
                "totalRevenue": state.field("revenue", "totalRevenue"),
            })
        })
        .gate_after(2, |state| {
            let revenue = state.number("revenue", "totalRevenue").unwrap_or(0.0);
            let expenses = state.number("expenses", "totalExpenses").unwrap_or(0.0);
            let surplus = revenue - expenses;
            let position = if surplus >= 0.0 {
                format!("a surplus of {}", amount(surplus))
            } else {
                format!("a deficit of {}", amount(-surplus))
            };
            GatePrompt {
                title: format!(
                    "FY{} budget review",
                    state.config()["fiscalYear"].as_str().unwrap_or("?")
                ),
                question: format!(
                    "Projected revenue of {} against expenses of {} leaves {}. \
                     Approve the draft and continue to allocation?",
                    amount(revenue),
                    amount(expenses),
                    position
                ),
                summary: json!({
                    "totalRevenue": revenue,
                    "totalExpenses": expenses,
                    "surplus": surplus,
                }),
            }
        })
        .step(allocation_step(), |state| {
            let revenue = state.number("revenue", "totalRevenue").unwrap_or(0.0);
            let expenses = state.number("expenses", "totalExpenses").unwrap_or(0.0);
            json!({
                "fiscalYear": state.config()["fiscalYear"],
                "totalRevenue": revenue,
                "totalExpenses": expenses,
                "surplus": revenue - expenses,
            })
        })
        .step(narrative_step(), |state| {
            json!({
                "fiscalYear": state.config()["fiscalYear"],
                "reportingCadence": state.config()["reportingCadence"],
                "allocations": state.field("allocation", "allocations"),
            })
        })
        .finish(|state| {
            let revenue = state.number("revenue", "totalRevenue").unwrap_or(0.0);
            let expenses = state.number("expenses", "totalExpenses").unwrap_or(0.0);
            json!({
                "fiscalYear": state.config()["fiscalYear"],
                "totalRevenue": revenue,
                "totalExpenses": expenses,
                "surplus": revenue - expenses,
                "allocations": state.field("allocation", "allocations"),
                "narrative": state.field("narrative", "narrative"),
            })
        })
        .build()
}

pub async fn run(
    runner: &PipelineRunner,
    config: Value,
    ctx: &ExecutionContext,
) -> Result<ProcessResult, WorkflowError> {
    let config: BudgetingConfig = serde_json::from_value(config)?;
    let effective = serde_json::to_value(&config)?;
    Ok(runner.run(&pipeline()?, effective, ctx).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: BudgetingConfig =
            serde_json::from_value(json!({ "fiscalYear": "2025", "annualBudget": 500000 }))
                .unwrap();
        assert_eq!(config.output_dir, "./workspace");
        assert_eq!(config.reporting_cadence, "quarterly");
    }

    #[test]
    fn test_config_requires_fiscal_year() {
        let result: Result<BudgetingConfig, _> =
            serde_json::from_value(json!({ "annualBudget": 500000 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_pipeline_shape() {
        let pipeline = pipeline().unwrap();
        let names: Vec<&str> = pipeline.steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["revenue", "expenses", "allocation", "narrative"]);
        assert_eq!(pipeline.gate().unwrap().after(), 2);
    }

    #[test]
    fn test_revenue_prompt_quotes_budget() {
        let spec = revenue_step().build(
            &json!({ "fiscalYear": "2025", "annualBudget": 500000.0, "outputDir": "./workspace" }),
            "run/revenue",
        );
        match spec.kind {
            crate::core::InvocationKind::Agent { prompt, .. } => {
                assert!(prompt.contains("fiscal year 2025"));
                assert!(prompt.contains("500000"));
            }
        }
    }
}
