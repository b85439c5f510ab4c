//! `vaultcert run` command handler

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vaultcert_core::config::HarnessConfig;
use vaultcert_flow::DiagnosticSink;
use vaultcert_scenarios::{
    FlowOutcome, LocalFixtureProvider, Scenario, ScenarioDriver, ScenarioReport, catalog, find,
    names,
};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Ctrl-C cancels the run: the current flow stops at the next step boundary
/// and every remaining flow is reported as failed.
pub async fn execute(
    args: RunArgs,
    config: HarnessConfig,
    sink: DiagnosticSink,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let scenarios = select_scenarios(&args)?;
    info!(
        scenarios = scenarios.len(),
        flows = scenarios.iter().map(|s| s.flows.len()).sum::<usize>(),
        "starting certification run"
    );

    let provider = LocalFixtureProvider::new(config.clone(), sink)?;
    let token = CancellationToken::new();
    let interrupt = token.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at the next step");
            interrupt.cancel();
        }
    });

    let driver = ScenarioDriver::new(Arc::new(provider), config).with_cancellation(token);
    let reports = driver.run_all(&scenarios).await;
    watcher.abort();

    let summary = RunSummary::new(reports);
    writer.render(&summary)?;
    summary.into_result()
}

/// Resolve the scenarios to run, in the order given.
pub fn select_scenarios(args: &RunArgs) -> Result<Vec<Scenario>, CliError> {
    if args.all {
        return Ok(catalog());
    }
    args.scenarios
        .iter()
        .map(|name| {
            find(name).ok_or_else(|| {
                CliError::Command(format!(
                    "unknown scenario: {name} (expected one of: {})",
                    names().join(", ")
                ))
            })
        })
        .collect()
}

/// Result of a `run` invocation.
#[derive(Serialize)]
pub struct RunSummary {
    pub passed: bool,
    pub total_flows: usize,
    pub failed_flows: usize,
    pub reports: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn new(reports: Vec<ScenarioReport>) -> Self {
        let total_flows = reports.iter().map(|r| r.outcomes.len()).sum();
        let failed_flows = reports.iter().map(ScenarioReport::failed_count).sum();
        Self {
            passed: failed_flows == 0,
            total_flows,
            failed_flows,
            reports,
        }
    }

    pub fn into_result(self) -> Result<(), CliError> {
        if self.passed {
            Ok(())
        } else {
            Err(CliError::CertificationFailed {
                failed: self.failed_flows,
                total: self.total_flows,
            })
        }
    }
}

impl Render for RunSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for report in &self.reports {
            let status = if report.passed() {
                "PASS".green().bold()
            } else {
                "FAIL".red().bold()
            };
            writeln!(w, "{} {}", status, report.scenario.bold())?;

            for outcome in &report.outcomes {
                match outcome {
                    FlowOutcome::Passed { flow, steps } => {
                        writeln!(w, "  {} {flow} ({steps} steps)", "ok".green())?;
                    }
                    FlowOutcome::Failed {
                        flow,
                        step,
                        index,
                        message,
                    } => {
                        writeln!(w, "  {} {flow}", "FAILED".red())?;
                        writeln!(w, "      at step {index}: {step}")?;
                        writeln!(w, "      {}", message.red())?;
                    }
                }
            }
        }

        writeln!(w)?;
        let passed = self.total_flows - self.failed_flows;
        writeln!(
            w,
            "{passed}/{} flows passed across {} scenarios",
            self.total_flows,
            self.reports.len()
        )?;
        Ok(())
    }
}
