use std::path::PathBuf;
use thiserror::Error;

/// Recoverable per-request failures. Every variant is caught at the CLI
/// boundary and rendered as a tagged failure report; none of them abort the
/// process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Activity '{0}' not supported")]
    UnknownActivity(String),

    #[error("Mode '{mode}' not supported for {activity}")]
    UnsupportedMode { activity: String, mode: String },

    #[error("Job script not found: {}", .0.display())]
    JobNotFound(PathBuf),

    #[error("Processing timeout exceeded ({0} seconds)")]
    Timeout(u64),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Failed to parse log: {0}")]
    LogParseFailed(String),
}

impl ProcessError {
    /// Stable machine-readable tag for the failure report.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::UnknownActivity(_) => "unknown_activity",
            ProcessError::UnsupportedMode { .. } => "unsupported_mode",
            ProcessError::JobNotFound(_) => "job_not_found",
            ProcessError::Timeout(_) => "timeout",
            ProcessError::JobFailed(_) => "job_failed",
            ProcessError::LogParseFailed(_) => "log_parse_failed",
        }
    }
}
