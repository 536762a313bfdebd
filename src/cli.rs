use crate::{
    config::Config,
    error::ProcessError,
    metrics::{self, Interpretation},
    pipeline::Pipeline,
    registry::{self, Activity, Mode},
    report::{FailureReport, WorkoutReport},
    runner::ProcessRunner,
    table::TabularLog,
    util::{ensure_dir, hash_file, now_rfc3339, sha256_hex},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "formcheck")]
#[command(about = "Workout video orchestrator (activity jobs + bounded subprocess + metrics)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./formcheck.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the job interpreter and registered job scripts.
    Doctor {},
    /// List supported activities and their modes.
    Activities {},
    /// Interpret an existing tabular log without running a job.
    Interpret {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        log: PathBuf,
        /// Dump unshaped rows instead of activity metrics.
        #[arg(long)]
        raw: bool,
    },
    /// Run the full pipeline on an uploaded workout video.
    Process {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "video")]
        mode: String,
        /// Override the uploads root for this session.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            doctor(&cfg)
        }
        Command::Activities {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            activities()
        }
        Command::Interpret { activity, log, raw } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            interpret(activity, log, *raw)
        }
        Command::Process {
            activity,
            input,
            mode,
            out_dir,
        } => process(&args, &cfg, activity, input, mode, out_dir.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("formcheck.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("formcheck.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let runner = ProcessRunner::new(cfg)?;
    let mut jobs = Vec::new();
    for activity in Activity::ALL {
        for mode in activity.supported_modes() {
            if let Ok((_, job)) = registry::resolve(activity.name(), mode) {
                let path = runner.script_path(&job);
                jobs.push(serde_json::json!({
                    "activity": activity.name(),
                    "mode": mode.name(),
                    "script": path,
                    "present": path.exists(),
                }));
            }
        }
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "python_exe": runner.python_exe(),
            "jobs_dir": cfg.paths.jobs_dir,
            "jobs": jobs,
        }))?
    );
    Ok(())
}

fn activities() -> Result<()> {
    let list: Vec<_> = Activity::ALL
        .into_iter()
        .map(|a| {
            serde_json::json!({
                "name": a.name(),
                "modes": a.supported_modes().iter().map(|m| m.name()).collect::<Vec<_>>(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

fn interpret(activity_name: &str, log_path: &Path, raw: bool) -> Result<()> {
    let outcome = (|| -> Result<serde_json::Value, ProcessError> {
        let log = TabularLog::from_path(log_path)?;
        if raw {
            return Ok(serde_json::to_value(metrics::interpret_raw(&log))
                .map_err(|e| ProcessError::LogParseFailed(e.to_string()))?);
        }
        let activity = Activity::from_name(activity_name)?;
        let value = match metrics::interpret(activity, &log)? {
            Interpretation::Metrics(record) => serde_json::to_value(record)
                .map_err(|e| ProcessError::LogParseFailed(e.to_string()))?,
            Interpretation::NoEvents(msg) => serde_json::json!({ "metrics_note": msg }),
        };
        Ok(value)
    })();

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => fail(err),
    }
}

fn process(
    args: &Args,
    cfg: &Config,
    activity_name: &str,
    input: &Path,
    mode_name: &str,
    out_override: Option<&Path>,
) -> Result<()> {
    validate_input(cfg, input)?;

    let Some(mode) = Mode::from_name(mode_name) else {
        return fail(ProcessError::UnsupportedMode {
            activity: activity_name.to_string(),
            mode: mode_name.to_string(),
        });
    };

    // Session ids hash the input content plus a nanosecond timestamp, so a
    // working directory is never reused across requests.
    let input_hash = hash_file(input).with_context(|| format!("hashing {}", input.display()))?;
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    let session_id = sha256_hex(format!("{input_hash}:{nanos}").as_bytes())[..32].to_string();

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.uploads_dir));
    let session_dir = out_root.join(&session_id);
    if session_dir.exists() {
        return Err(anyhow!(
            "session dir already exists: {}",
            session_dir.display()
        ));
    }
    ensure_dir(&session_dir)?;
    ensure_dir(&session_dir.join("logs"))?;

    let _guard = init_logging(args, cfg, resolve_log_path(cfg, Some(&session_dir)).as_deref())?;
    info!("session_id={session_id} dir={}", session_dir.display());

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(session_dir.join("effective-config.toml"), raw)?;
    }

    // The job writes its output directory as a sibling of the video, so the
    // upload is copied into the isolated session dir under a fixed stem.
    let ext = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("mp4")
        .to_ascii_lowercase();
    let video_path = session_dir.join(format!("input.{ext}"));
    std::fs::copy(input, &video_path)
        .with_context(|| format!("copying upload into {}", session_dir.display()))?;

    let runner = ProcessRunner::new(cfg)?;
    let pipeline = Pipeline::new(cfg, runner);

    let started = now_rfc3339();
    let outcome = pipeline.process(activity_name, &video_path, mode);
    let finished = now_rfc3339();

    if !cfg.global.keep_uploads {
        let _ = std::fs::remove_file(&video_path);
    }

    match outcome {
        Ok(result) => {
            let report = WorkoutReport::from_result(&session_id, started, finished, result);
            if cfg.output.write_result_json {
                std::fs::write(
                    session_dir.join(&cfg.output.result_filename),
                    serde_json::to_string_pretty(&report)?,
                )?;
            }
            if cfg.global.print_summary {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(())
        }
        Err(err) => fail(err),
    }
}

/// Every recoverable pipeline failure surfaces as one tagged JSON shape on
/// stdout before the nonzero exit.
fn fail(err: ProcessError) -> Result<()> {
    let report = FailureReport::new(err.kind(), err.to_string());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Err(anyhow::Error::new(err))
}

const VIDEO_EXTS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if !input.exists() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    let bytes = std::fs::metadata(input).with_context(|| "stat input")?.len();
    if bytes > cfg.limits.max_input_file_bytes {
        return Err(anyhow!("input exceeds max_input_file_bytes: {bytes}"));
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if !VIDEO_EXTS.contains(&ext.to_ascii_lowercase().as_str()) {
            return Err(anyhow!("input is not a video: {}", input.display()));
        }
    } else {
        warn!("input has no extension; assuming mp4: {}", input.display());
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn resolve_log_path(cfg: &Config, session_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(session_dir) = session_dir {
        return Some(session_dir.join("logs").join("formcheck.log"));
    }

    Some(PathBuf::from(&cfg.paths.uploads_dir).join("formcheck.log"))
}
