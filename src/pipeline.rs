use crate::{
    config::Config,
    error::ProcessError,
    metrics::{self, Interpretation, MetricsRecord},
    outputs,
    registry::{self, Activity, Mode},
    runner::JobRunner,
    table::TabularLog,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The orchestrator: Validate -> Run -> Locate -> Interpret -> Assemble,
/// terminating early with a tagged [`ProcessError`] at any stage.
pub struct Pipeline<R: JobRunner> {
    cfg: Config,
    runner: R,
}

/// Assembled per-request result. A missing log is surfaced as success with
/// empty metrics, not as a failure.
#[derive(Debug, Clone)]
pub struct WorkoutResult {
    pub activity: Activity,
    pub mode: Mode,
    pub annotated_video: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub metrics: Option<MetricsRecord>,
    pub metrics_note: Option<String>,
    pub raw_output: String,
}

impl<R: JobRunner> Pipeline<R> {
    pub fn new(cfg: &Config, runner: R) -> Self {
        Self {
            cfg: cfg.clone(),
            runner,
        }
    }

    pub fn process(
        &self,
        activity_name: &str,
        video: &Path,
        mode: Mode,
    ) -> Result<WorkoutResult, ProcessError> {
        let (activity, job) = registry::resolve(activity_name, mode)?;
        info!("resolved {activity} mode={mode} script={}", job.script);

        let invocation = self.runner.run(&job, video)?;
        info!(
            "job finished exit={} elapsed={:.1}s",
            invocation.exit_code,
            invocation.elapsed.as_secs_f64()
        );

        let output_dir = outputs::output_dir_for(video);
        let found = outputs::locate(&output_dir);
        info!(
            "located annotated={:?} log={:?}",
            found.annotated_video, found.log_file
        );

        let (metrics, metrics_note) = match &found.log_file {
            Some(log_path) => self.interpret_log(activity, log_path),
            None => (None, None),
        };

        Ok(WorkoutResult {
            activity,
            mode,
            annotated_video: found.annotated_video,
            log_file: found.log_file,
            metrics,
            metrics_note,
            raw_output: invocation.stdout,
        })
    }

    /// A job that already succeeded is never failed retroactively: a
    /// malformed log degrades to success with no metrics, keeping the
    /// annotated video and raw log available.
    fn interpret_log(
        &self,
        activity: Activity,
        log_path: &Path,
    ) -> (Option<MetricsRecord>, Option<String>) {
        let parsed = TabularLog::from_path(log_path)
            .and_then(|log| metrics::interpret(activity, &log));
        match parsed {
            Ok(Interpretation::Metrics(record)) => (Some(record), None),
            Ok(Interpretation::NoEvents(msg)) => {
                info!("{activity}: {msg}");
                (None, Some(msg.to_string()))
            }
            Err(err) => {
                warn!("log interpretation failed for {}: {err}", log_path.display());
                (None, Some(err.to_string()))
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
