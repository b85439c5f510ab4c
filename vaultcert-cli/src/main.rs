//! vaultcert CLI entry point

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;

use vaultcert_flow::{DiagnosticSink, init_tracing};

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    // JSON output owns stdout, so the runtime's log stream is not echoed there.
    let sink = DiagnosticSink::global().with_echo(cli.output == OutputFormat::Text);

    let loaded = commands::load_config(&cli.config).await;
    let mut general = loaded
        .as_ref()
        .map(|l| l.config.general.clone())
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    init_tracing(&general, &sink).map_err(|e| CliError::Config(format!("{e:#}")))?;
    vaultcert_core::metrics::describe_all();

    if loaded.as_ref().is_ok_and(|l| !l.from_file) {
        tracing::info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    match cli.command {
        Commands::List => commands::list::execute(&writer),
        Commands::Run(args) => {
            let loaded = loaded?;
            commands::run::execute(args, loaded.config, sink, &writer).await
        }
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
