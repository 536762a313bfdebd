use crate::{metrics::MetricsRecord, pipeline::WorkoutResult};
use serde::Serialize;

/// Session envelope written as result.json and printed on success.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutReport {
    pub session_id: String,
    pub status: String,
    pub activity: String,
    pub mode: String,
    pub started: String,
    pub finished: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_note: Option<String>,
    pub raw_output: String,
}

impl WorkoutReport {
    pub fn from_result(
        session_id: &str,
        started: String,
        finished: String,
        result: WorkoutResult,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            status: "success".to_string(),
            activity: result.activity.name().to_string(),
            mode: result.mode.name().to_string(),
            started,
            finished,
            annotated_video: result.annotated_video.map(|p| p.display().to_string()),
            log_file: result.log_file.map(|p| p.display().to_string()),
            metrics: result.metrics,
            metrics_note: result.metrics_note,
            raw_output: result.raw_output,
        }
    }
}

/// The single tagged failure shape every recoverable error collapses into.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub status: String,
    pub kind: String,
    pub message: String,
}

impl FailureReport {
    pub fn new(kind: &str, message: String) -> Self {
        Self {
            status: "error".to_string(),
            kind: kind.to_string(),
            message,
        }
    }
}
