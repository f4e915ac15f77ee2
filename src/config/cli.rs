use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::observability::LogLevel;

#[derive(Debug, Parser, Clone)]
#[command(
    author = "The drep Team",
    version,
    about = "Call the account namespace of a drep node.",
    long_about = "drep-account\n\nWallet and account operations against a drep node over JSON-RPC."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML config file (default: ~/.drep/account.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// RPC endpoint of the node (default: http://127.0.0.1:15645).
    #[arg(long)]
    pub url: Option<String>,

    /// Request timeout in seconds, at least 1.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Log filter level.
    #[arg(long)]
    pub log: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file_path: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Invoke an account method, e.g. `call transfer 0xfrom 0xto 100`.
    Call {
        /// Method name as listed by `methods`.
        method: String,
        /// Positional params; each is read as JSON, falling back to a plain string.
        params: Vec<String>,
    },
    /// List the account methods with their remote call and param count.
    Methods,
}

/// Reads a command line param as JSON, or as a JSON string when it is not valid JSON.
pub fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
