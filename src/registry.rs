use crate::error::ProcessError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of supported fitness tests. Unknown names never get past
/// [`resolve`], so the interpreter's raw fallback is unreachable by typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    PushUps,
    PullUps,
    VerticalJump,
    ShuttleRun,
    SitUps,
    SitAndReach,
    StandingBroadJump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Video,
    Live,
}

impl Activity {
    pub const ALL: [Activity; 7] = [
        Activity::PushUps,
        Activity::PullUps,
        Activity::VerticalJump,
        Activity::ShuttleRun,
        Activity::SitUps,
        Activity::SitAndReach,
        Activity::StandingBroadJump,
    ];

    /// Canonical wire name, exactly as clients send it.
    pub fn name(self) -> &'static str {
        match self {
            Activity::PushUps => "Push-ups",
            Activity::PullUps => "Pull-ups",
            Activity::VerticalJump => "Vertical Jump",
            Activity::ShuttleRun => "Shuttle Run",
            Activity::SitUps => "Sit-ups",
            Activity::SitAndReach => "Sit & Reach",
            Activity::StandingBroadJump => "Standing Broad Jump",
        }
    }

    pub fn from_name(name: &str) -> Result<Activity, ProcessError> {
        Activity::ALL
            .into_iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| ProcessError::UnknownActivity(name.to_string()))
    }

    fn script(self, mode: Mode) -> Option<&'static str> {
        match (self, mode) {
            (Activity::PushUps, Mode::Video) => Some("run_pushup_video.py"),
            (Activity::PushUps, Mode::Live) => Some("pushup_live.py"),
            (Activity::PullUps, Mode::Video) => Some("pullup_video.py"),
            (Activity::PullUps, Mode::Live) => Some("pullup_live.py"),
            (Activity::VerticalJump, Mode::Video) => Some("verticaljump_video.py"),
            (Activity::VerticalJump, Mode::Live) => Some("verticaljump_live.py"),
            (Activity::ShuttleRun, Mode::Video) => Some("shuttlerun_video.py"),
            (Activity::ShuttleRun, Mode::Live) => Some("shuttlerun_live.py"),
            (Activity::SitUps, Mode::Video) => Some("situp_video.py"),
            (Activity::SitAndReach, Mode::Video) => Some("sitreach_video.py"),
            (Activity::StandingBroadJump, Mode::Video) => Some("verticalbroadjump_video.py"),
            (Activity::SitUps | Activity::SitAndReach | Activity::StandingBroadJump, Mode::Live) => {
                None
            }
        }
    }

    pub fn supported_modes(self) -> Vec<Mode> {
        [Mode::Video, Mode::Live]
            .into_iter()
            .filter(|m| self.script(*m).is_some())
            .collect()
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Video => "video",
            Mode::Live => "live",
        }
    }

    pub fn from_name(name: &str) -> Option<Mode> {
        match name {
            "video" => Some(Mode::Video),
            "live" => Some(Mode::Live),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A job bound to one (activity, mode) pair: the script filename the
/// process runner joins against `paths.jobs_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub script: String,
}

/// Pure lookup against the static activity table.
pub fn resolve(activity_name: &str, mode: Mode) -> Result<(Activity, JobRef), ProcessError> {
    let activity = Activity::from_name(activity_name)?;
    let script = activity
        .script(mode)
        .ok_or_else(|| ProcessError::UnsupportedMode {
            activity: activity.name().to_string(),
            mode: mode.name().to_string(),
        })?;
    Ok((
        activity,
        JobRef {
            script: script.to_string(),
        },
    ))
}
