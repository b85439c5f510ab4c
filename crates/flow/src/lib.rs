#![doc = include_str!("../README.md")]

pub mod context;
pub mod logging;
pub mod runner;
pub mod sink;
pub mod step;
pub mod steps;

pub use context::FlowContext;
pub use logging::init_tracing;
pub use runner::{ACQUIRE_CAPTURE_STEP, FlowReport, FlowRunner};
pub use sink::{CaptureHandle, DIAGNOSTIC_TARGET, DiagnosticSink, INIT_FAILURE_MARKER};
pub use step::{Flow, LabeledStep, Step};
pub use steps::{Log, Sleep};
