use formcheck::{
    error::ProcessError,
    registry::{Activity, Mode, resolve},
};

#[test]
fn every_activity_has_a_video_job() {
    for activity in Activity::ALL {
        let (resolved, job) = resolve(activity.name(), Mode::Video).expect(activity.name());
        assert_eq!(resolved, activity);
        assert!(job.script.ends_with(".py"));
    }
}

#[test]
fn live_jobs_exist_for_four_activities() {
    for name in ["Push-ups", "Pull-ups", "Vertical Jump", "Shuttle Run"] {
        assert!(resolve(name, Mode::Live).is_ok(), "{name} should have a live job");
    }
}

#[test]
fn live_mode_is_unsupported_for_three_activities() {
    for name in ["Sit-ups", "Sit & Reach", "Standing Broad Jump"] {
        let err = resolve(name, Mode::Live).unwrap_err();
        match err {
            ProcessError::UnsupportedMode { activity, mode } => {
                assert_eq!(activity, name);
                assert_eq!(mode, "live");
            }
            other => panic!("expected UnsupportedMode, got {other:?}"),
        }
    }
}

#[test]
fn unknown_activity_names_are_rejected() {
    for name in ["Pushups", "push-ups", "Burpees", ""] {
        let err = resolve(name, Mode::Video).unwrap_err();
        assert!(matches!(err, ProcessError::UnknownActivity(_)), "{name}: {err:?}");
    }
}

#[test]
fn mode_names_round_trip() {
    assert_eq!(Mode::from_name("video"), Some(Mode::Video));
    assert_eq!(Mode::from_name("live"), Some(Mode::Live));
    assert_eq!(Mode::from_name("batch"), None);
}
