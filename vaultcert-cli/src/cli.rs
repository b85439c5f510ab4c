//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// vaultcert -- HashiCorp Vault secret store certification harness.
///
/// Use `vaultcert <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "vaultcert", version, about, long_about = None)]
pub struct Cli {
    /// Path to the vaultcert.toml configuration file.
    #[arg(short, long, default_value = "vaultcert.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the certification scenarios.
    List,

    /// Run certification scenarios against a local store and sidecar.
    Run(RunArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run one or more scenarios by name.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario names (see `vaultcert list`).
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub scenarios: Vec<String>,

    /// Run the whole catalog in order.
    #[arg(long)]
    pub all: bool,
}

// ---- config ----

/// Manage configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file.
    Validate,
    /// Show the effective configuration.
    Show {
        /// Show only one section (general, store, runtime, timing, docker).
        #[arg(long)]
        section: Option<String>,
    },
}
