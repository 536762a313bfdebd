#![cfg(unix)]

use formcheck::{
    config::Config,
    error::ProcessError,
    registry::JobRef,
    runner::{JobRunner, ProcessRunner},
};
use std::path::Path;

/// Shell scripts stand in for the analysis jobs; the interpreter is /bin/sh
/// instead of python, which exercises the same spawn/wait/kill path.
fn runner_with_script(dir: &Path, script: &str, timeout_seconds: u64) -> (ProcessRunner, JobRef) {
    let name = "job.sh";
    std::fs::write(dir.join(name), script).unwrap();

    let mut cfg = Config::default();
    cfg.paths.jobs_dir = dir.display().to_string();
    cfg.runner.python_exe = "/bin/sh".into();
    cfg.limits.job_timeout_seconds = timeout_seconds;

    (
        ProcessRunner::new(&cfg).unwrap(),
        JobRef {
            script: name.to_string(),
        },
    )
}

#[test]
fn success_captures_stdout() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, job) = runner_with_script(tmp.path(), "echo processed \"$1\"\n", 30);

    let inv = runner.run(&job, Path::new("clip.mp4")).unwrap();
    assert_eq!(inv.exit_code, 0);
    assert!(inv.stdout.contains("processed clip.mp4"));
}

#[test]
fn nonzero_exit_reports_job_failed_with_stderr() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, job) = runner_with_script(tmp.path(), "echo boom >&2\nexit 2\n", 30);

    let err = runner.run(&job, Path::new("clip.mp4")).unwrap_err();
    match err {
        ProcessError::JobFailed(msg) => assert!(msg.contains("boom"), "{msg}"),
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[test]
fn nonzero_exit_with_silent_stderr_gets_generic_message() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, job) = runner_with_script(tmp.path(), "exit 1\n", 30);

    let err = runner.run(&job, Path::new("clip.mp4")).unwrap_err();
    match err {
        ProcessError::JobFailed(msg) => assert_eq!(msg, "Unknown error"),
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[test]
fn overlong_job_is_killed_and_reported_as_timeout() {
    let tmp = tempfile::tempdir().unwrap();
    let (runner, job) = runner_with_script(tmp.path(), "exec sleep 10\n", 1);

    let started = std::time::Instant::now();
    let err = runner.run(&job, Path::new("clip.mp4")).unwrap_err();
    assert!(matches!(err, ProcessError::Timeout(1)), "{err:?}");
    // Well under the job's own 10s sleep: the child was killed, not awaited.
    assert!(started.elapsed().as_secs() < 5);
}

#[test]
fn missing_script_is_job_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.paths.jobs_dir = tmp.path().display().to_string();
    cfg.runner.python_exe = "/bin/sh".into();

    let runner = ProcessRunner::new(&cfg).unwrap();
    let job = JobRef {
        script: "nope.py".to_string(),
    };
    let err = runner.run(&job, Path::new("clip.mp4")).unwrap_err();
    assert!(matches!(err, ProcessError::JobNotFound(_)), "{err:?}");
}
