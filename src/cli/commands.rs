//! CLI command definitions

use clap::Args;

/// Run a workflow
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Workflow name (see `atelier list`)
    #[arg(short, long)]
    pub workflow: String,

    /// Path to a run-configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Configuration overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Agent program handling invocations (defaults to atelier-agent on PATH)
    #[arg(long)]
    pub invoker: Option<String>,

    /// Per-invocation timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,
}

/// Describe a workflow
#[derive(Debug, Args, Clone)]
pub struct DescribeCommand {
    /// Workflow name
    #[arg(short, long)]
    pub workflow: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List available workflows
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Show run counts from history
    #[arg(long)]
    pub with_counts: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Workflow name to filter by
    #[arg(short, long)]
    pub workflow: Option<String>,

    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Show full details
    #[arg(long)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a specific run by id
    #[arg(long)]
    pub run_id: Option<String>,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("fiscalYear=2025").unwrap(),
            ("fiscalYear".to_string(), "2025".to_string())
        );
        // Values may contain '='
        assert_eq!(
            parse_key_value("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("nopair").is_err());
    }
}
