//! CLI-specific error types and exit code mapping

use logwarden_check::CheckError;
use logwarden_core::CheckState;
use logwarden_core::error::LogwardenError;
use logwarden_search::SearchError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a one-line `UNKNOWN: <reason>`
/// status. The `exit_code()` method maps errors to monitoring plugin exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logwarden-core.
    #[error("{0}")]
    Core(#[from] LogwardenError),

    /// Action file, status file or history command failure.
    #[error("{0}")]
    Check(#[from] CheckError),

    /// Document store client could not be built.
    #[error("{0}")]
    Search(#[from] SearchError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// A failure of the tool itself is always reported as UNKNOWN (3) so
    /// the monitoring system does not confuse it with a WARNING or CRITICAL
    /// result.
    pub fn exit_code(&self) -> i32 {
        CheckState::Unknown.exit_code()
    }
}
