//! Terminal breakpoint gate - interactive review at the console

use crate::cli::output::{style, GATE, INFO};
use crate::core::{BreakpointRequest, ResumeDecision};
use crate::invoker::{BreakpointInvoker, InvokeError};
use async_trait::async_trait;
use console::Term;

/// Gate that renders the request on the terminal and reads a decision
///
/// Blocks the run until the reviewer answers; there is no timeout.
#[derive(Debug, Clone, Default)]
pub struct TerminalGate;

#[async_trait]
impl BreakpointInvoker for TerminalGate {
    async fn present(&self, request: BreakpointRequest) -> Result<ResumeDecision, InvokeError> {
        // Terminal I/O is blocking; keep it off the async executor
        tokio::task::spawn_blocking(move || prompt_for_decision(&request))
            .await
            .map_err(|e| InvokeError::InvocationFailure(format!("review prompt panicked: {}", e)))?
    }
}

fn prompt_for_decision(request: &BreakpointRequest) -> Result<ResumeDecision, InvokeError> {
    let term = Term::stdout();

    println!();
    println!("{} {}", GATE, style(&request.title).bold().yellow());
    println!("   {}", request.question);

    if !request.context.files.is_empty() {
        println!("   Files so far:");
        for file in &request.context.files {
            println!(
                "     - {} ({})",
                style(&file.path).cyan(),
                style(&file.format).dim()
            );
        }
    }
    if !request.context.summary.is_null() {
        println!(
            "   Summary: {}",
            style(request.context.summary.to_string()).dim()
        );
    }

    loop {
        println!(
            "{} [a]pprove / [r]eject <reason> / [m]odify <json patch>:",
            INFO
        );
        let line = term
            .read_line()
            .map_err(|e| InvokeError::InvocationFailure(format!("review channel closed: {}", e)))?;
        let line = line.trim();

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "a" | "approve" => return Ok(ResumeDecision::Approve),
            "r" | "reject" => {
                let reason = if rest.is_empty() {
                    "rejected at review".to_string()
                } else {
                    rest.to_string()
                };
                return Ok(ResumeDecision::Reject { reason });
            }
            "m" | "modify" => match serde_json::from_str(rest) {
                Ok(patch) => return Ok(ResumeDecision::Modify { patch }),
                Err(e) => {
                    println!("   {}", style(format!("Invalid patch JSON: {}", e)).red());
                }
            },
            _ => {
                println!("   {}", style("Unrecognised answer").red());
            }
        }
    }
}
