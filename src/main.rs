mod cli;
mod core;
mod execution;
mod invoker;
mod persistence;
mod workflows;

use anyhow::{Context, Result};
use cli::commands::{DescribeCommand, HistoryCommand, ListCommand, RunCommand};
use cli::gate::TerminalGate;
use cli::output::*;
use cli::{Cli, Command};
use execution::{ExecutionContext, PipelineRunner};
use invoker::{AutoApproveGate, BreakpointInvoker, InvokerConfig, SubprocessInvoker};
#[cfg(feature = "sqlite")]
use persistence::SqliteRunStore;
#[cfg(not(feature = "sqlite"))]
use persistence::InMemoryPersistence;
use persistence::{create_summary, PersistenceBackend, RunSummary};
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_workflow(cmd, cli.clone()).await?,
        Command::Describe(cmd) => describe_workflow(cmd)?,
        Command::List(cmd) => list_workflows(cmd).await?,
        Command::History(cmd) => show_history(cmd).await?,
    }

    Ok(())
}

async fn run_workflow(cmd: &RunCommand, cli: Cli) -> Result<()> {
    // Load run configuration
    let mut config = match &cmd.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            serde_yaml::from_str(&text).context("Failed to parse config file")?
        }
        None => Value::Object(serde_json::Map::new()),
    };

    // Apply overrides
    for (key, value) in &cmd.set {
        let parsed: Value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
        if let Some(object) = config.as_object_mut() {
            object.insert(key.clone(), parsed);
        }
        println!(
            "{} Config override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    // Set up persistence
    let store: Option<Arc<dyn PersistenceBackend>> = if cmd.no_history {
        None
    } else {
        Some(default_store().await?)
    };

    // Build the execution context: invoker, gate, cancellation
    let mut invoker_config = InvokerConfig::new();
    if let Some(program) = &cmd.invoker {
        invoker_config = invoker_config.with_program(program.clone());
    }
    if let Some(timeout_secs) = cmd.timeout_secs {
        invoker_config = invoker_config.with_timeout_secs(timeout_secs);
    }
    let invoker = Arc::new(SubprocessInvoker::new(invoker_config));

    let gate: Arc<dyn BreakpointInvoker> = if cli.yes {
        Arc::new(AutoApproveGate)
    } else {
        Arc::new(TerminalGate)
    };

    let ctx = ExecutionContext::new(invoker, gate);

    // Ctrl-C aborts the run between suspension points
    let cancel = ctx.cancellation_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::SeqCst);
        }
    });

    // Stream run events to the terminal, with a step progress bar
    let runner = PipelineRunner::new();
    let progress: Arc<std::sync::Mutex<Option<indicatif::ProgressBar>>> =
        Arc::new(std::sync::Mutex::new(None));
    let progress_handle = progress.clone();
    runner.add_event_handler(move |event| {
        let mut bar = progress_handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match &event {
            execution::RunEvent::RunStarted { total_steps, .. } => {
                *bar = Some(create_progress_bar(*total_steps));
            }
            execution::RunEvent::StepCompleted { .. } => {
                if let Some(bar) = bar.as_ref() {
                    bar.inc(1);
                }
            }
            execution::RunEvent::RunCompleted { .. } => {
                if let Some(bar) = bar.take() {
                    bar.finish_and_clear();
                }
            }
            _ => {}
        }

        let line = format_run_event(&event);
        match bar.as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    });

    println!();
    let result = workflows::run(&runner, &cmd.workflow, config, &ctx).await?;

    // Save to history
    if let Some(store) = store {
        let summary = create_summary(&result);
        store.save_run(&summary).await?;
        println!(
            "\n{} Run saved to history (ID: {})",
            INFO,
            style(&summary.run_id.to_string()[..8]).dim()
        );
    }

    // Print final status and payload
    if result.success {
        println!(
            "\n{} {} completed {} in {}ms",
            CHECK,
            style(&result.metadata.workflow).bold(),
            style("successfully").green(),
            result.duration_ms
        );
        println!("{}", serde_json::to_string_pretty(&result.payload)?);
    } else {
        println!(
            "\n{} {} {}",
            CROSS,
            style(&result.metadata.workflow).bold(),
            style("aborted").red()
        );
        if let Some(message) = &result.error {
            error!("{}", message);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn describe_workflow(cmd: &DescribeCommand) -> Result<()> {
    let pipeline = workflows::pipeline(&cmd.workflow)?;

    if cmd.json {
        let steps: Vec<&str> = pipeline.steps().iter().map(|s| s.name()).collect();
        let data = serde_json::json!({
            "workflow": pipeline.name(),
            "steps": steps,
            "gate_after": pipeline.gate().map(|g| g.after()),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} {}", INFO, style(pipeline.name()).bold());
    for (index, step) in pipeline.steps().iter().enumerate() {
        println!("  {}. {}", index + 1, style(step.name()).cyan());
        if let Some(gate) = pipeline.gate() {
            if gate.after() == index + 1 {
                println!("  {} {}", GATE, style("human review").yellow());
            }
        }
    }

    Ok(())
}

async fn list_workflows(cmd: &ListCommand) -> Result<()> {
    if cmd.json {
        let mut json_data = Vec::new();
        for name in workflows::WORKFLOWS {
            json_data.push(serde_json::json!({ "name": name }));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "workflows": json_data }))?
        );
        return Ok(());
    }

    println!("{} Available workflows:", INFO);

    let store = if cmd.with_counts {
        Some(default_store().await?)
    } else {
        None
    };

    for name in workflows::WORKFLOWS {
        if let Some(store) = &store {
            let runs = store.list_runs(name).await?;
            let completed = runs.iter().filter(|r| r.success).count();
            let aborted = runs.len() - completed;
            println!(
                "  {} ({} runs: {} completed, {} aborted)",
                style(name).bold(),
                style(runs.len()).cyan(),
                style(completed).green(),
                style(aborted).red()
            );
        } else {
            println!("  {}", style(name).bold());
        }
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = default_store().await?;

    // If a specific run is requested
    if let Some(run_id_str) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id_str).context("Invalid run ID format")?;
        match store.load_run(run_id).await? {
            Some(summary) => print_run_details(&summary, cmd.verbose)?,
            None => println!("{} Run not found", WARN),
        }
        return Ok(());
    }

    // List runs for one workflow or all
    let runs = if let Some(workflow) = &cmd.workflow {
        store.list_runs(workflow).await?
    } else {
        let mut all_runs = Vec::new();
        for workflow in store.list_workflows().await? {
            all_runs.extend(store.list_runs(&workflow).await?);
        }
        all_runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        all_runs.into_iter().take(cmd.limit).collect()
    };

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        for summary in runs.iter().take(cmd.limit) {
            println!("  {}", format_run_summary(summary));
        }
    }

    Ok(())
}

fn print_run_details(summary: &RunSummary, verbose: bool) -> Result<()> {
    println!("{} Run Details", INFO);
    println!("  ID: {}", style(summary.run_id).cyan());
    println!("  Workflow: {}", style(&summary.workflow).bold());
    println!("  Outcome: {}", format_outcome(summary.success));
    if let Some(message) = &summary.error {
        println!("  Error: {}", style(message).red());
    }
    println!("  Started: {}", style(summary.started_at.to_rfc3339()).dim());
    println!(
        "  Finished: {}",
        style(summary.finished_at.to_rfc3339()).dim()
    );
    println!("  Duration: {}ms", style(summary.duration_ms).dim());
    println!("  Artifacts: {}", style(summary.artifact_count).cyan());

    if verbose {
        println!("\n  {}", style("Full details:").bold());
        let json = serde_json::to_string_pretty(summary)?;
        for line in json.lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn default_store() -> Result<Arc<dyn PersistenceBackend>> {
    Ok(Arc::new(SqliteRunStore::with_default_path().await?))
}

#[cfg(not(feature = "sqlite"))]
async fn default_store() -> Result<Arc<dyn PersistenceBackend>> {
    Ok(Arc::new(InMemoryPersistence::new()))
}
