//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

/// logwarden -- incremental log checks with alert history.
///
/// Use `logwarden <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logwarden", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logwarden.toml configuration file.
    ///
    /// When omitted, /etc/logwarden/logwarden.toml is read if it exists.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Override the action definition file.
    #[arg(long, global = true)]
    pub action_file: Option<String>,

    /// Override the document store host.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Override the document store port.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Override the request timeout in seconds (also the PIT keep-alive).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Monitoring plugin / table output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan new log documents and report threshold states.
    Check(CheckArgs),

    /// List alert history entries.
    List(ListArgs),

    /// Mark alert history entries as handled.
    Handle(HistoryArgs),

    /// Remove alert history entries.
    Rm(HistoryArgs),

    /// Set the checkpoint of actions without touching their history.
    Init(InitArgs),
}

/// Restrict a command to the named actions (default: all actions).
#[derive(Args, Debug, Default)]
pub struct ActionFilter {
    /// Action name (repeatable).
    #[arg(short = 'a', long = "action", value_name = "ACTION")]
    pub actions: Vec<String>,
}

// ---- check ----

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub filter: ActionFilter,
}

// ---- list ----

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: ActionFilter,

    /// Print history UUIDs in bold.
    #[arg(long)]
    pub highlight_uuid: bool,
}

// ---- handle / rm ----

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["uuids", "all"])
))]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: ActionFilter,

    /// History entry UUID (repeatable).
    #[arg(short = 'u', long = "uuid", value_name = "UUID")]
    pub uuids: Vec<String>,

    /// Apply to every entry of the selected actions.
    #[arg(long)]
    pub all: bool,
}

// ---- init ----

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub filter: ActionFilter,

    /// Checkpoint value (default: now, e.g. 2024-05-01T10:00:00.000Z).
    #[arg(long)]
    pub timestamp: Option<String>,
}
