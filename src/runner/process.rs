use super::{JobRunner, types::JobInvocation};
use crate::{config::Config, error::ProcessError, registry::JobRef};
use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs analysis jobs as `<interpreter> <script> <video>` child processes,
/// cwd pinned to the script's own directory so jobs can resolve their
/// relative resources (models, weights).
pub struct ProcessRunner {
    cfg: Config,
    jobs_dir: PathBuf,
    python_exe: PathBuf,
}

impl ProcessRunner {
    pub fn new(cfg: &Config) -> Result<Self> {
        let jobs_dir = PathBuf::from(&cfg.paths.jobs_dir);
        if cfg.security.pin_jobs_dir {
            let cwd = std::env::current_dir().with_context(|| "current_dir")?;
            let canon = jobs_dir
                .canonicalize()
                .with_context(|| format!("canonicalize jobs_dir: {}", jobs_dir.display()))?;
            if !canon.starts_with(&cwd) {
                return Err(anyhow!(
                    "jobs_dir is outside cwd while pin_jobs_dir=true: {}",
                    canon.display()
                ));
            }
        }
        let python_exe = resolve_python_exe(&cfg.runner.python_exe);
        Ok(Self {
            cfg: cfg.clone(),
            jobs_dir,
            python_exe,
        })
    }

    pub fn python_exe(&self) -> &Path {
        &self.python_exe
    }

    pub fn script_path(&self, job: &JobRef) -> PathBuf {
        self.jobs_dir.join(&job.script)
    }
}

impl JobRunner for ProcessRunner {
    fn run(&self, job: &JobRef, video: &Path) -> Result<JobInvocation, ProcessError> {
        let script = self.script_path(job);
        if !script.exists() {
            return Err(ProcessError::JobNotFound(script));
        }

        let timeout = self.cfg.limits.job_timeout_seconds;
        debug!(
            "job run {} video={} timeout={}s",
            script.display(),
            video.display(),
            timeout
        );

        let mut cmd = Command::new(&self.python_exe);
        cmd.arg(&script);
        cmd.arg(video);
        if let Some(parent) = script.parent() {
            cmd.current_dir(parent);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.cfg.runner.env {
            cmd.env(k, v);
        }

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ProcessError::JobFailed(format!("spawning {}: {e}", script.display())))?;

        let output = if timeout > 0 {
            wait_with_timeout(&mut child, Duration::from_secs(timeout))?
        } else {
            child
                .wait_with_output()
                .map_err(|e| ProcessError::JobFailed(format!("waiting for job: {e}")))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let msg = if stderr.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ProcessError::JobFailed(msg));
        }

        if self.cfg.debug.keep_job_stderr && !stderr.is_empty() {
            debug!("job stderr {}: {}", script.display(), stderr.trim());
        }

        Ok(JobInvocation {
            exit_code: output.status.code().unwrap_or(0),
            stdout,
            stderr,
            elapsed: started.elapsed(),
        })
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("FORMCHECK_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output, ProcessError> {
    // Drain pipes while waiting so a chatty job can't deadlock itself on a
    // full stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let join = |t: std::thread::JoinHandle<std::io::Result<Vec<u8>>>, name: &str| {
        t.join()
            .map_err(|_| ProcessError::JobFailed(format!("{name} reader thread panicked")))?
            .map_err(|e| ProcessError::JobFailed(format!("read {name}: {e}")))
    };

    let start = Instant::now();
    loop {
        let status = child
            .try_wait()
            .map_err(|e| ProcessError::JobFailed(format!("try_wait: {e}")))?;

        if let Some(status) = status {
            let stdout = join(stdout_thread, "stdout")?;
            let stderr = join(stderr_thread, "stderr")?;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if start.elapsed() > timeout {
            warn!("job timed out after {:?}, killing", timeout);
            let _ = child.kill();
            let _ = child.wait();
            // Readers unblock once the pipes close; discard whatever partial
            // output the job managed to write.
            let _ = join(stdout_thread, "stdout");
            let _ = join(stderr_thread, "stderr");
            return Err(ProcessError::Timeout(timeout.as_secs()));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
