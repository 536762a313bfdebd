use formcheck::{
    error::ProcessError,
    metrics::{Interpretation, MetricsRecord, interpret, interpret_raw},
    registry::Activity,
    table::TabularLog,
};

fn log(csv: &str) -> TabularLog {
    TabularLog::from_reader(csv.as_bytes()).expect("parse csv")
}

fn metrics(activity: Activity, csv: &str) -> MetricsRecord {
    match interpret(activity, &log(csv)).unwrap() {
        Interpretation::Metrics(m) => m,
        Interpretation::NoEvents(msg) => panic!("unexpected NoEvents: {msg}"),
    }
}

#[test]
fn rep_based_counts_and_accuracy() {
    let mut csv = String::from("correct,up_time,dip_duration_sec,min_elbow_angle\n");
    for i in 0..10 {
        let correct = if i < 7 { 1 } else { 0 };
        csv.push_str(&format!("{correct},{}.0,0.8,{}\n", i + 1, 60 + i));
    }

    match metrics(Activity::PushUps, &csv) {
        MetricsRecord::RepBased {
            reps_completed,
            correct_reps,
            incorrect_reps,
            time_sec,
            avg_rep_duration_sec,
            min_angle,
            max_angle,
            form_accuracy_percent,
        } => {
            assert_eq!(reps_completed, 10);
            assert_eq!(correct_reps, 7);
            assert_eq!(incorrect_reps, 3);
            assert_eq!(time_sec, 10.0);
            assert_eq!(avg_rep_duration_sec, 0.8);
            assert_eq!(min_angle, 60.0);
            assert_eq!(max_angle, 69.0);
            assert_eq!(form_accuracy_percent, 70.0);
        }
        other => panic!("expected RepBased, got {other:?}"),
    }
}

#[test]
fn rep_based_tolerates_empty_log() {
    match metrics(Activity::SitUps, "correct,up_time\n") {
        MetricsRecord::RepBased {
            reps_completed,
            correct_reps,
            form_accuracy_percent,
            ..
        } => {
            assert_eq!(reps_completed, 0);
            assert_eq!(correct_reps, 0);
            assert_eq!(form_accuracy_percent, 0.0);
        }
        other => panic!("expected RepBased, got {other:?}"),
    }
}

#[test]
fn rep_based_defaults_to_all_correct_without_correct_column() {
    match metrics(Activity::PullUps, "down_time\n1.0\n2.0\n3.0\n") {
        MetricsRecord::RepBased {
            reps_completed,
            correct_reps,
            incorrect_reps,
            time_sec,
            form_accuracy_percent,
            ..
        } => {
            assert_eq!(reps_completed, 3);
            assert_eq!(correct_reps, 3);
            assert_eq!(incorrect_reps, 0);
            // No up_time column, so elapsed falls back to down_time.
            assert_eq!(time_sec, 3.0);
            assert_eq!(form_accuracy_percent, 100.0);
        }
        other => panic!("expected RepBased, got {other:?}"),
    }
}

#[test]
fn vertical_jump_heights_and_timing() {
    let csv = "jump_height_m,air_time_s,takeoff_time,landing_time\n\
               0.3,0.4,1.0,1.5\n\
               0.5,0.55,3.0,3.6\n\
               0.4,0.45,5.0,5.5\n";
    match metrics(Activity::VerticalJump, csv) {
        MetricsRecord::VerticalJump {
            jump_height_m,
            avg_jump_height_m,
            air_time_s,
            total_jumps,
            time_of_max_height_sec,
            total_time_sec,
        } => {
            assert_eq!(jump_height_m, 0.5);
            assert_eq!(avg_jump_height_m, 0.4);
            assert_eq!(air_time_s, 0.55);
            assert_eq!(total_jumps, 3);
            assert_eq!(time_of_max_height_sec, 3.0);
            assert_eq!(total_time_sec, 5.5);
        }
        other => panic!("expected VerticalJump, got {other:?}"),
    }
}

#[test]
fn vertical_jump_requires_height_column() {
    let err = interpret(Activity::VerticalJump, &log("air_time_s\n0.4\n")).unwrap_err();
    assert!(matches!(err, ProcessError::LogParseFailed(_)), "{err:?}");
}

#[test]
fn vertical_jump_empty_log_is_no_events() {
    let out = interpret(Activity::VerticalJump, &log("jump_height_m\n")).unwrap();
    assert_eq!(out, Interpretation::NoEvents("No jumps detected"));
}

#[test]
fn shuttle_run_distance_is_laps_times_twenty() {
    let csv = "split_time\n5.0\n5.2\n5.1\n5.3\n";
    match metrics(Activity::ShuttleRun, csv) {
        MetricsRecord::ShuttleRun {
            distance_m,
            time_sec,
            laps_completed,
            avg_split_time_sec,
        } => {
            assert_eq!(distance_m, 80);
            assert_eq!(time_sec, 20.6);
            assert_eq!(laps_completed, 4);
            assert_eq!(avg_split_time_sec, 5.15);
        }
        other => panic!("expected ShuttleRun, got {other:?}"),
    }
}

#[test]
fn shuttle_run_empty_log_is_no_events() {
    let out = interpret(Activity::ShuttleRun, &log("split_time\n")).unwrap();
    assert_eq!(out, Interpretation::NoEvents("No shuttle runs detected"));
}

#[test]
fn sit_reach_best_of_column() {
    let csv = "reach_cm,time_sec\n21.5,3.0\n24.25,2.5\n22.0,3.5\n";
    match metrics(Activity::SitAndReach, csv) {
        MetricsRecord::SitReach { reach_cm, time_sec } => {
            assert_eq!(reach_cm, 24.25);
            assert_eq!(time_sec, 9.0);
        }
        other => panic!("expected SitReach, got {other:?}"),
    }
}

#[test]
fn sit_reach_keeps_negative_best_behind_toe_line() {
    // Reaches short of the toe line are negative; the best of an
    // all-negative column is still the negative maximum, not zero.
    let csv = "reach_cm,time_sec\n-5.0,2.0\n-2.0,2.5\n-4.25,3.0\n";
    match metrics(Activity::SitAndReach, csv) {
        MetricsRecord::SitReach { reach_cm, time_sec } => {
            assert_eq!(reach_cm, -2.0);
            assert_eq!(time_sec, 7.5);
        }
        other => panic!("expected SitReach, got {other:?}"),
    }
}

#[test]
fn sit_reach_empty_log_is_no_events() {
    let out = interpret(Activity::SitAndReach, &log("reach_cm\n")).unwrap();
    assert_eq!(out, Interpretation::NoEvents("No measurements detected"));
}

#[test]
fn broad_jump_distances() {
    let csv = "distance_m\n1.8\n2.2\n2.0\n";
    match metrics(Activity::StandingBroadJump, csv) {
        MetricsRecord::BroadJump {
            max_distance_m,
            avg_distance_m,
            total_jumps,
        } => {
            assert_eq!(max_distance_m, 2.2);
            assert_eq!(avg_distance_m, 2.0);
            assert_eq!(total_jumps, 3);
        }
        other => panic!("expected BroadJump, got {other:?}"),
    }
}

#[test]
fn non_numeric_cell_in_referenced_column_fails_parse() {
    let err = interpret(Activity::ShuttleRun, &log("split_time\nfast\n")).unwrap_err();
    assert!(matches!(err, ProcessError::LogParseFailed(_)), "{err:?}");
}

#[test]
fn interpretation_is_idempotent() {
    let csv = "jump_height_m,air_time_s,takeoff_time,landing_time\n0.3,0.4,1.0,1.5\n0.5,0.5,3.0,3.6\n";
    let table = log(csv);
    let a = interpret(Activity::VerticalJump, &table).unwrap();
    let b = interpret(Activity::VerticalJump, &table).unwrap();
    let (Interpretation::Metrics(a), Interpretation::Metrics(b)) = (a, b) else {
        panic!("expected metrics");
    };
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn raw_fallback_keeps_rows_unshaped() {
    let table = log("foo,bar\n1.5,hello\n2,world\n");
    match interpret_raw(&table) {
        MetricsRecord::Raw { raw_data } => {
            assert_eq!(raw_data.len(), 2);
            assert_eq!(raw_data[0]["foo"], serde_json::json!(1.5));
            assert_eq!(raw_data[0]["bar"], serde_json::json!("hello"));
        }
        other => panic!("expected Raw, got {other:?}"),
    }
}
