//! Core domain types for the Helsi workout tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and sessions (both planned templates and logged workouts)
//! - Derived improvements and the progression report
//!
//! Field names on disk use the PascalCase keys of the existing
//! `workouts.json` / `log.json` files.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Exercise and Session
// ============================================================================

/// One movement within a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Exercise {
    pub name: String,

    #[serde(rename = "Sets")]
    pub planned_sets: u32,

    /// Reps per completed set, empty until logged
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reps: Vec<i32>,

    /// Weight per completed set, same length contract as `reps`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weights: Vec<f64>,

    #[serde(default)]
    pub rest: String,

    /// Informational only; never creates an exclusion
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub superset_with: Option<String>,
}

impl Exercise {
    /// Create a planned (not yet logged) exercise
    pub fn planned(name: impl Into<String>, planned_sets: u32, rest: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            planned_sets,
            reps: Vec::new(),
            weights: Vec::new(),
            rest: rest.into(),
            superset_with: None,
        }
    }

    /// True when at least one set has both reps and weight recorded
    pub fn is_logged(&self) -> bool {
        !self.reps.is_empty() && !self.weights.is_empty()
    }

    pub fn first_rep(&self) -> Option<i32> {
        self.reps.first().copied()
    }

    pub fn last_rep(&self) -> Option<i32> {
        self.reps.last().copied()
    }

    pub fn first_weight(&self) -> Option<f64> {
        self.weights.first().copied()
    }

    pub fn last_weight(&self) -> Option<f64> {
        self.weights.last().copied()
    }
}

/// A planned or logged workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    /// Absent for planned templates, set to the logging moment once completed
    #[serde(
        default,
        deserialize_with = "zero_time_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub exercises: Vec<Exercise>,

    pub name: String,
}

impl Session {
    /// Create a planned session template
    pub fn planned(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            date: None,
            exercises,
            name: name.into(),
        }
    }

    pub fn exercise(&self, name: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.name == name)
    }

    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|e| e.name.as_str())
    }
}

// ============================================================================
// Progression
// ============================================================================

/// Positive change between the first qualifying and the most recent instance
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Improvement {
    pub exercise_name: String,
    pub weight_increase: f64,
    pub rep_increase: i32,
}

/// Counters and ranked improvements computed from the logged history
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ProgressionReport {
    pub total_sessions: usize,
    pub sessions_last_month: usize,
    pub sessions_last_week: usize,
    pub improvements: Vec<Improvement>,
}

impl ProgressionReport {
    /// The highest ranked improvements, at most `n`
    pub fn top(&self, n: usize) -> &[Improvement] {
        &self.improvements[..self.improvements.len().min(n)]
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Older files carry `0001-01-01T00:00:00Z` for templates that were never logged
fn zero_time_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|dt| dt.year() > 1))
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_go_style_files() {
        let json = r#"[{
            "Date": "0001-01-01T00:00:00Z",
            "Exercises": [
                {"Name": "Knebøy", "Sets": 3, "Reps": null, "Weights": null, "Rest": "90s", "SupersetWith": ""},
                {"Name": "Roing", "Sets": 2, "Reps": [8, 8], "Weights": [40, 42.5], "Rest": "60s", "SupersetWith": "Knebøy"}
            ],
            "Name": "Dag A"
        }]"#;

        let sessions: Vec<Session> = serde_json::from_str(json).unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].date.is_none());

        let squat = &sessions[0].exercises[0];
        assert_eq!(squat.planned_sets, 3);
        assert!(squat.reps.is_empty());
        assert!(squat.weights.is_empty());
        assert_eq!(squat.superset_with, None);

        let row = &sessions[0].exercises[1];
        assert_eq!(row.weights, vec![40.0, 42.5]);
        assert_eq!(row.superset_with.as_deref(), Some("Knebøy"));
    }

    #[test]
    fn test_missing_date_is_planned() {
        let json = r#"{"Name": "Dag B", "Exercises": [{"Name": "Markløft", "Sets": 1}]}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.date.is_none());
        assert_eq!(session.exercises[0].rest, "");
    }

    #[test]
    fn test_serializes_pascal_case_keys() {
        let session = Session::planned("A", vec![Exercise::planned("Bench", 3, "2 min")]);
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["Name"], "A");
        assert_eq!(value["Exercises"][0]["Sets"], 3);
        assert_eq!(value["Exercises"][0]["Rest"], "2 min");
        assert!(value.get("Date").is_none());
    }

    #[test]
    fn test_top_caps_at_length() {
        let report = ProgressionReport {
            improvements: vec![Improvement {
                exercise_name: "Squat".into(),
                weight_increase: 5.0,
                rep_increase: 0,
            }],
            ..Default::default()
        };

        assert_eq!(report.top(3).len(), 1);
        assert!(report.top(0).is_empty());
    }

    #[test]
    fn test_logged_helpers() {
        let mut ex = Exercise::planned("Bench", 2, "");
        assert!(!ex.is_logged());
        assert_eq!(ex.last_weight(), None);

        ex.reps = vec![5, 6];
        ex.weights = vec![60.0, 65.0];
        assert!(ex.is_logged());
        assert_eq!(ex.first_rep(), Some(5));
        assert_eq!(ex.last_rep(), Some(6));
        assert_eq!(ex.first_weight(), Some(60.0));
        assert_eq!(ex.last_weight(), Some(65.0));
    }
}
