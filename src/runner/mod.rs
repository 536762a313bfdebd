pub mod process;
pub mod types;

use crate::{error::ProcessError, registry::JobRef};
use std::path::Path;

pub use process::ProcessRunner;
pub use types::JobInvocation;

/// Executes one analysis job against one input video. Behind a trait so the
/// pipeline can be driven by a scripted runner in tests.
pub trait JobRunner {
    fn run(&self, job: &JobRef, video: &Path) -> Result<JobInvocation, ProcessError>;
}
