//! Flow runner: strictly ordered, fail-fast step execution.
//!
//! Steps run one after another on the caller's task. The first failing step
//! stops the run; later steps are never invoked and nothing is rolled back.
//! Cleanup (stopping a server, a runtime) must be an explicit trailing step.

use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use tokio::time::Instant;
use tracing::Instrument;

use vaultcert_core::error::{StepError, StepFailure};
use vaultcert_core::metrics as m;

use crate::context::FlowContext;
use crate::step::{Flow, LabeledStep};

/// Label reported when the diagnostic capture cannot be acquired.
pub const ACQUIRE_CAPTURE_STEP: &str = "acquire log capture";

/// Summary of a flow that ran to completion.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub description: String,
    pub steps_run: usize,
    pub elapsed: Duration,
}

/// Stateless flow runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowRunner;

impl FlowRunner {
    pub fn new() -> Self {
        Self
    }

    /// Execute `flow` and report the first failing step, if any.
    ///
    /// If the flow requested a diagnostic capture it is acquired before the
    /// first step and released when this call returns, whatever the outcome.
    /// A busy sink fails the flow at index 0 without running any step.
    pub async fn run(&self, flow: Flow) -> Result<FlowReport, StepFailure> {
        let Flow {
            description,
            steps,
            capture,
            deadline,
            cancellation,
        } = flow;

        counter!(m::FLOWS_TOTAL).increment(1);
        let started = Instant::now();

        let mut ctx = FlowContext::new(description.clone());
        if let Some(token) = cancellation {
            ctx = ctx.with_cancellation(token);
        }
        if let Some(deadline) = deadline {
            ctx = ctx.with_deadline(started + deadline);
        }
        if let Some(sink) = capture {
            match sink.begin() {
                Ok(handle) => ctx = ctx.with_capture(handle),
                Err(e) => {
                    return Err(fail(&description, ACQUIRE_CAPTURE_STEP, 0, e.into()));
                }
            }
        }

        tracing::info!(flow = %description, steps = steps.len(), "running flow");

        for (i, LabeledStep { label, step }) in steps.iter().enumerate() {
            let index = i + 1;

            if ctx.is_cancelled() {
                tracing::warn!(flow = %description, step = %label, index, "flow cancelled, step not started");
                return Err(fail(&description, label, index, StepError::Cancelled));
            }

            counter!(m::STEPS_TOTAL).increment(1);
            let span = tracing::info_span!("step", flow = %description, step = %label, index);
            let result = async {
                tracing::info!("starting step");
                step.execute(&ctx).await
            }
            .instrument(span)
            .await;

            if let Err(error) = result {
                return Err(fail(&description, label, index, error));
            }
        }

        let report = FlowReport {
            description,
            steps_run: steps.len(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            flow = %report.description,
            steps = report.steps_run,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "flow passed"
        );
        Ok(report)
    }
}

fn fail(flow: &str, step: &str, index: usize, error: StepError) -> StepFailure {
    counter!(m::FLOW_FAILURES_TOTAL).increment(1);
    tracing::error!(flow, step, index, error = %error, "flow failed");
    StepFailure {
        flow: flow.to_owned(),
        step: step.to_owned(),
        index,
        error,
    }
}
