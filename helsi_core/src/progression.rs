//! Progression report over the logged history.
//!
//! For every exercise of every logged session the engine compares the most
//! recent values against a baseline: the earliest instance of the same
//! exercise inside the lookback window (anchored to `now`).
//! - Weight delta: last weight of the current instance minus first weight of the baseline
//! - Rep delta: same, for reps
//! - Only positive changes are reported, ranked by weight delta

use crate::config::ProgressionConfig;
use crate::{Exercise, Improvement, ProgressionReport, Session};
use chrono::{DateTime, Datelike, Duration, Months, Utc};

/// Compute counters and ranked improvements
///
/// Pure function of its inputs: no I/O, cannot fail. History order is
/// preserved, never re-sorted.
pub fn compute_progression(
    history: &[Session],
    now: DateTime<Utc>,
    config: &ProgressionConfig,
) -> ProgressionReport {
    let window_start = window_start(now, config.window_months);
    let week_start = days_before(now, config.week_days);

    let mut report = ProgressionReport::default();

    for session in history {
        if let Some(date) = session.date {
            if date > window_start {
                report.sessions_last_month += 1;
            }
            if date > week_start {
                report.sessions_last_week += 1;
            }
        }
        report.total_sessions += 1;

        report
            .improvements
            .extend(session_improvements(session, history, now, window_start));
    }

    // Stable, so equal deltas keep encounter order
    report
        .improvements
        .sort_by(|a, b| b.weight_increase.total_cmp(&a.weight_increase));

    tracing::debug!(
        "Progression: {} sessions, {} improvements",
        report.total_sessions,
        report.improvements.len()
    );

    report
}

/// Start of the lookback window, `months` calendar months before `now`
///
/// A day of month missing from the target month rolls over into the next
/// one (March 31 minus one month is March 2 or 3), matching how the
/// existing log files were counted.
pub fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let first_of_month = now
        .with_day(1)
        .and_then(|d| d.checked_sub_months(Months::new(months)));
    first_of_month
        .and_then(|d| d.checked_add_signed(Duration::days(i64::from(now.day()) - 1)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `now` minus `days` days, clamped to the earliest representable time
pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn session_improvements(
    session: &Session,
    history: &[Session],
    now: DateTime<Utc>,
    since: DateTime<Utc>,
) -> Vec<Improvement> {
    let mut improvements = Vec::new();

    for exercise in &session.exercises {
        let Some(first) = find_first_instance(&exercise.name, history, now, since) else {
            continue;
        };

        // Nothing to compare when either side has no logged sets
        let (Some(last_weight), Some(last_reps), Some(first_weight), Some(first_reps)) = (
            exercise.last_weight(),
            exercise.last_rep(),
            first.first_weight(),
            first.first_rep(),
        ) else {
            continue;
        };

        let weight_increase = last_weight - first_weight;
        let rep_increase = last_reps - first_reps;

        if weight_increase > 0.0 || rep_increase > 0 {
            improvements.push(Improvement {
                exercise_name: exercise.name.clone(),
                weight_increase,
                rep_increase,
            });
        }
    }

    improvements
}

/// Earliest instance of `name` dated in `[since, now]`
///
/// The whole history is scanned with a floating upper bound that starts at
/// `now` and tightens to the best date found so far. Ties keep the instance
/// encountered first. Returns an owned snapshot.
pub fn find_first_instance(
    name: &str,
    history: &[Session],
    now: DateTime<Utc>,
    since: DateTime<Utc>,
) -> Option<Exercise> {
    let mut earliest_date = now;
    let mut earliest: Option<&Exercise> = None;

    for session in history {
        let Some(date) = session.date else {
            continue;
        };
        if date < since || date > earliest_date {
            continue;
        }

        for exercise in session.exercises.iter().filter(|e| e.name == name) {
            if earliest.is_none() || date < earliest_date {
                earliest_date = date;
                earliest = Some(exercise);
            }
        }
    }

    earliest.cloned()
}
