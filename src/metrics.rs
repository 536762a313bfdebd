use crate::{
    error::ProcessError,
    registry::Activity,
    table::{ColumnSpec, TabularLog},
};
use serde::Serialize;
use serde_json::{Map, Value};

// Column policy table. Only jump_height_m is hard-required; a rep row with
// no `correct` column counts as correct; every other column falls back to 0.
const CORRECT: ColumnSpec = ColumnSpec::Optional("correct", 1.0);
const DIP_DURATION: ColumnSpec = ColumnSpec::Optional("dip_duration_sec", 0.0);
const UP_TIME: ColumnSpec = ColumnSpec::Optional("up_time", 0.0);
const DOWN_TIME: ColumnSpec = ColumnSpec::Optional("down_time", 0.0);
const MIN_ELBOW_ANGLE: ColumnSpec = ColumnSpec::Optional("min_elbow_angle", 0.0);
const JUMP_HEIGHT: ColumnSpec = ColumnSpec::Required("jump_height_m");
const AIR_TIME: ColumnSpec = ColumnSpec::Optional("air_time_s", 0.0);
const TAKEOFF_TIME: ColumnSpec = ColumnSpec::Optional("takeoff_time", 0.0);
const LANDING_TIME: ColumnSpec = ColumnSpec::Optional("landing_time", 0.0);
const SPLIT_TIME: ColumnSpec = ColumnSpec::Optional("split_time", 0.0);
const REACH_CM: ColumnSpec = ColumnSpec::Optional("reach_cm", 0.0);
const TIME_SEC: ColumnSpec = ColumnSpec::Optional("time_sec", 0.0);
const DISTANCE_M: ColumnSpec = ColumnSpec::Optional("distance_m", 0.0);

/// Fixed per-lap distance for the shuttle run course, in meters.
const SHUTTLE_LAP_METERS: u64 = 20;

/// Activity-shaped aggregate handed back to the client. Field names are the
/// wire contract; serialization is untagged so each shape flattens into the
/// result payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricsRecord {
    RepBased {
        reps_completed: u64,
        correct_reps: i64,
        incorrect_reps: i64,
        time_sec: f64,
        avg_rep_duration_sec: f64,
        min_angle: f64,
        max_angle: f64,
        form_accuracy_percent: f64,
    },
    VerticalJump {
        jump_height_m: f64,
        avg_jump_height_m: f64,
        air_time_s: f64,
        total_jumps: u64,
        time_of_max_height_sec: f64,
        total_time_sec: f64,
    },
    ShuttleRun {
        distance_m: u64,
        time_sec: f64,
        laps_completed: u64,
        avg_split_time_sec: f64,
    },
    SitReach {
        reach_cm: f64,
        time_sec: f64,
    },
    BroadJump {
        max_distance_m: f64,
        avg_distance_m: f64,
        total_jumps: u64,
    },
    Raw {
        raw_data: Vec<Map<String, Value>>,
    },
}

/// Outcome of interpreting a log: either a metrics record, or the
/// activity-specific "nothing detected" condition for an empty event log.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Metrics(MetricsRecord),
    NoEvents(&'static str),
}

/// Dispatch on activity identity. The match is exhaustive over the closed
/// activity set; unshaped output only exists behind [`interpret_raw`].
pub fn interpret(activity: Activity, log: &TabularLog) -> Result<Interpretation, ProcessError> {
    match activity {
        Activity::PushUps | Activity::PullUps | Activity::SitUps => rep_based(log),
        Activity::VerticalJump => vertical_jump(log),
        Activity::ShuttleRun => shuttle_run(log),
        Activity::SitAndReach => sit_reach(log),
        Activity::StandingBroadJump => broad_jump(log),
    }
}

/// Forward-compatibility escape hatch for logs with an unanticipated schema.
pub fn interpret_raw(log: &TabularLog) -> MetricsRecord {
    MetricsRecord::Raw {
        raw_data: log.raw_rows(),
    }
}

/// Push-ups, pull-ups, sit-ups. An empty log is a legitimate zero-rep
/// result, not an error.
fn rep_based(log: &TabularLog) -> Result<Interpretation, ProcessError> {
    let total_reps = log.row_count() as u64;
    let correct_reps = log.sum(CORRECT)? as i64;
    let incorrect_reps = total_reps as i64 - correct_reps;

    let avg_duration = log.mean(DIP_DURATION)?;

    let total_time = if log.has_column(UP_TIME.name()) {
        log.max(UP_TIME)?
    } else if log.has_column(DOWN_TIME.name()) {
        log.max(DOWN_TIME)?
    } else {
        0.0
    };

    let min_angle = log.min(MIN_ELBOW_ANGLE)?;
    let max_angle = log.max(MIN_ELBOW_ANGLE)?;

    let accuracy = if total_reps > 0 {
        correct_reps as f64 / total_reps as f64 * 100.0
    } else {
        0.0
    };

    Ok(Interpretation::Metrics(MetricsRecord::RepBased {
        reps_completed: total_reps,
        correct_reps,
        incorrect_reps,
        time_sec: round2(total_time),
        avg_rep_duration_sec: round2(avg_duration),
        min_angle: round2(min_angle),
        max_angle: round2(max_angle),
        form_accuracy_percent: round1(accuracy),
    }))
}

fn vertical_jump(log: &TabularLog) -> Result<Interpretation, ProcessError> {
    if log.is_empty() {
        return Ok(Interpretation::NoEvents("No jumps detected"));
    }

    let max_height = log.max(JUMP_HEIGHT)?;
    let avg_height = log.mean(JUMP_HEIGHT)?;
    let max_air_time = log.max(AIR_TIME)?;

    let time_of_max = match log.max_row(JUMP_HEIGHT)? {
        Some(row) => log.value_at(row, TAKEOFF_TIME)?,
        None => 0.0,
    };
    let total_time = log.max(LANDING_TIME)?;

    Ok(Interpretation::Metrics(MetricsRecord::VerticalJump {
        jump_height_m: round3(max_height),
        avg_jump_height_m: round3(avg_height),
        air_time_s: round2(max_air_time),
        total_jumps: log.row_count() as u64,
        time_of_max_height_sec: round2(time_of_max),
        total_time_sec: round2(total_time),
    }))
}

fn shuttle_run(log: &TabularLog) -> Result<Interpretation, ProcessError> {
    if log.is_empty() {
        return Ok(Interpretation::NoEvents("No shuttle runs detected"));
    }

    let laps = log.row_count() as u64;
    Ok(Interpretation::Metrics(MetricsRecord::ShuttleRun {
        distance_m: laps * SHUTTLE_LAP_METERS,
        time_sec: round2(log.sum(SPLIT_TIME)?),
        laps_completed: laps,
        avg_split_time_sec: round2(log.mean(SPLIT_TIME)?),
    }))
}

fn sit_reach(log: &TabularLog) -> Result<Interpretation, ProcessError> {
    if log.is_empty() {
        return Ok(Interpretation::NoEvents("No measurements detected"));
    }

    Ok(Interpretation::Metrics(MetricsRecord::SitReach {
        reach_cm: round2(log.max(REACH_CM)?),
        time_sec: round2(log.sum(TIME_SEC)?),
    }))
}

fn broad_jump(log: &TabularLog) -> Result<Interpretation, ProcessError> {
    if log.is_empty() {
        return Ok(Interpretation::NoEvents("No jumps detected"));
    }

    Ok(Interpretation::Metrics(MetricsRecord::BroadJump {
        max_distance_m: round2(log.max(DISTANCE_M)?),
        avg_distance_m: round2(log.mean(DISTANCE_M)?),
        total_jumps: log.row_count() as u64,
    }))
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
