//! CLI-specific error types and exit code mapping

use vaultcert_core::error::CertError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// One or more flows did not pass.
    #[error("certification failed: {failed} of {total} flows did not pass")]
    CertificationFailed { failed: usize, total: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from vaultcert-core.
    #[error("{0}")]
    Core(#[from] CertError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                        |
    /// |------|--------------------------------|
    /// | 0    | Success                        |
    /// | 1    | Flow failure / command error   |
    /// | 2    | Configuration error            |
    /// | 10   | IO error                       |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(CertError::Config(_)) => 2,
            Self::Io(_) => 10,
            Self::CertificationFailed { .. }
            | Self::JsonSerialize(_)
            | Self::Command(_)
            | Self::Core(_) => 1,
        }
    }
}
