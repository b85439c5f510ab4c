//! Step command objects and the [`Flow`] that orders them.
//!
//! A step receives every dependency it needs at construction time and
//! exposes a single `execute(ctx)` capability. Data flowing between steps
//! is therefore visible in the step's fields rather than hidden in closures.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use vaultcert_core::error::StepError;
use vaultcert_core::types::BoxFuture;

use crate::context::FlowContext;
use crate::sink::DiagnosticSink;

/// A single flow step.
pub trait Step: Send + Sync {
    /// Run the step's action.
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>>;
}

impl<S: Step + ?Sized> Step for Box<S> {
    fn execute<'a>(&'a self, ctx: &'a FlowContext) -> BoxFuture<'a, Result<(), StepError>> {
        (**self).execute(ctx)
    }
}

/// A step together with the label used in logs and failure reports.
pub struct LabeledStep {
    pub label: String,
    pub step: Box<dyn Step>,
}

/// An ordered, named sequence of labeled steps.
///
/// Built once per scenario invocation and consumed by
/// [`FlowRunner::run`](crate::runner::FlowRunner::run).
pub struct Flow {
    pub(crate) description: String,
    pub(crate) steps: Vec<LabeledStep>,
    pub(crate) capture: Option<DiagnosticSink>,
    pub(crate) deadline: Option<Duration>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Flow {
    /// Create an empty flow.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            steps: Vec::new(),
            capture: None,
            deadline: None,
            cancellation: None,
        }
    }

    /// Append a step.
    pub fn step(mut self, label: impl Into<String>, step: impl Step + 'static) -> Self {
        self.steps.push(LabeledStep {
            label: label.into(),
            step: Box::new(step),
        });
        self
    }

    /// Append an already boxed step.
    pub fn boxed_step(mut self, label: impl Into<String>, step: Box<dyn Step>) -> Self {
        self.steps.push(LabeledStep {
            label: label.into(),
            step,
        });
        self
    }

    /// Append every step of `steps` in order.
    pub fn steps(mut self, steps: impl IntoIterator<Item = LabeledStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Request a diagnostic log capture on `sink` for the whole run.
    pub fn capture_diagnostics(mut self, sink: DiagnosticSink) -> Self {
        self.capture = Some(sink);
        self
    }

    /// Advisory deadline measured from the start of the run.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share a cancellation token with the run.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step labels in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn captures_diagnostics(&self) -> bool {
        self.capture.is_some()
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("description", &self.description)
            .field("steps", &self.labels())
            .field("capture", &self.capture.is_some())
            .field("deadline", &self.deadline)
            .finish()
    }
}
