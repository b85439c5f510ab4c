//! Logging initialization.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `HarnessConfig`. Events on the [`DIAGNOSTIC_TARGET`] target are routed
//! to the [`DiagnosticSink`] instead of the main output, so in-process
//! components can report initialization failures to the log capture.

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::filter::{Targets, filter_fn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use vaultcert_core::config::GeneralConfig;

use crate::sink::{DIAGNOSTIC_TARGET, DiagnosticSink};

/// Layer writing diagnostic-target events into `sink`, one line per event.
pub fn diagnostic_layer<S>(sink: DiagnosticSink) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(DIAGNOSTIC_TARGET, tracing::Level::TRACE))
}

/// Initialize the global tracing subscriber.
///
/// Harness logs go to stderr; stdout is left to command output.
///
/// Must be called at most once per process; a second call returns an error.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable output (default)
pub fn init_tracing(config: &GeneralConfig, sink: &DiagnosticSink) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let not_diagnostic = filter_fn(|meta| meta.target() != DIAGNOSTIC_TARGET);

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_filter(not_diagnostic),
                )
                .with(diagnostic_layer(sink.clone()))
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_filter(not_diagnostic),
                )
                .with(diagnostic_layer(sink.clone()))
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}
