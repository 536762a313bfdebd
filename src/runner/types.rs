use std::time::Duration;

/// Captured record of one completed (exit status 0) job run. The stdout text
/// is opaque diagnostics for the client; nothing downstream parses it.
#[derive(Debug, Clone)]
pub struct JobInvocation {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}
