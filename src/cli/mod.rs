//! Command-line interface

pub mod commands;
pub mod gate;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{DescribeCommand, HistoryCommand, ListCommand, RunCommand};

/// Checkpointed task-pipeline runner for arts-and-culture workflows
#[derive(Debug, Parser, Clone)]
#[command(name = "atelier")]
#[command(author = "Atelier Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A checkpointed task-pipeline runner for arts-and-culture workflows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Approve breakpoints without prompting
    #[arg(short, long, global = true)]
    pub yes: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a workflow
    Run(RunCommand),

    /// Describe a workflow's steps and gate
    Describe(DescribeCommand),

    /// List available workflows
    List(ListCommand),

    /// Show run history
    History(HistoryCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
