//! Read-only queries over the logged history.

use crate::{Exercise, Session};
use crate::progression::days_before;
use chrono::{DateTime, Utc};

/// Sessions logged under `name`, in history order
pub fn sessions_named<'a>(history: &'a [Session], name: &str) -> Vec<&'a Session> {
    history.iter().filter(|s| s.name == name).collect()
}

/// Sessions dated within the last `days` days of `now`
pub fn sessions_within(history: &[Session], now: DateTime<Utc>, days: i64) -> Vec<&Session> {
    let cutoff = days_before(now, days);
    history
        .iter()
        .filter(|s| s.date.is_some_and(|d| d >= cutoff))
        .collect()
}

/// Exercises of a session that have recorded weights (shown in the history view)
pub fn recorded_exercises(session: &Session) -> impl Iterator<Item = &Exercise> {
    session.exercises.iter().filter(|e| !e.weights.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_session(name: &str, days_ago: i64) -> Session {
        let mut bench = Exercise::planned("Bench", 1, "2 min");
        bench.reps = vec![5];
        bench.weights = vec![60.0];
        Session {
            date: Some(Utc::now() - Duration::days(days_ago)),
            exercises: vec![bench, Exercise::planned("Flyes", 2, "")],
            name: name.into(),
        }
    }

    #[test]
    fn test_sessions_named_keeps_order() {
        let history = vec![
            create_test_session("A", 5),
            create_test_session("B", 3),
            create_test_session("A", 1),
        ];

        let found = sessions_named(&history, "A");
        assert_eq!(found.len(), 2);
        assert!(found[0].date < found[1].date);
    }

    #[test]
    fn test_sessions_within_window() {
        let history = vec![
            create_test_session("A", 10),
            create_test_session("B", 3),
            Session::planned("C", vec![]),
        ];

        let recent = sessions_within(&history, Utc::now(), 7);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "B");
    }

    #[test]
    fn test_recorded_exercises_skips_unlogged() {
        let session = create_test_session("A", 0);
        let names: Vec<_> = recorded_exercises(&session).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bench"]);
    }

    #[test]
    fn test_sessions_within_huge_window() {
        let history = vec![create_test_session("A", 3000), Session::planned("B", vec![])];

        let recent = sessions_within(&history, Utc::now(), 1_000_000_000);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "A");
    }
}
