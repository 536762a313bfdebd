use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifacts a job leaves behind. Either may be missing; the caller decides
/// whether that is fatal.
#[derive(Debug, Clone, Default)]
pub struct JobOutputs {
    pub annotated_video: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// The job contract: outputs land in a sibling directory named after the
/// input video's file stem.
pub fn output_dir_for(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    video
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(stem)
}

const ANNOTATED_EXTS: [&str; 3] = [".mp4", ".avi", ".mov"];

/// Non-recursive artifact discovery. Entries are matched in lexicographic
/// filename order so repeated runs over the same directory agree.
pub fn locate(output_dir: &Path) -> JobOutputs {
    let Ok(entries) = std::fs::read_dir(output_dir) else {
        debug!("output dir missing: {}", output_dir.display());
        return JobOutputs::default();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();

    let annotated_video = ANNOTATED_EXTS.iter().find_map(|ext| {
        let suffix = format!("_annotated{ext}");
        names
            .iter()
            .find(|n| n.ends_with(&suffix))
            .map(|n| output_dir.join(n))
    });

    let log_file = names
        .iter()
        .find(|n| Path::new(n).extension().and_then(|e| e.to_str()) == Some("csv"))
        .map(|n| output_dir.join(n));

    JobOutputs {
        annotated_video,
        log_file,
    }
}
