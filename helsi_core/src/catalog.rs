//! Planned workout catalog.
//!
//! The catalog is a JSON array of session templates supplied by the operator
//! (`workouts.json`). It is read once and never mutated.

use crate::types::*;
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// The planned sessions available for logging
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub sessions: Vec<Session>,
}

/// Load the planned catalog from a JSON file
///
/// A missing or unreadable catalog is fatal for the caller, so every failure
/// maps to `StoreUnavailable`.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::StoreUnavailable(format!("cannot read catalog {}: {}", path.display(), e))
    })?;

    let sessions: Vec<Session> = serde_json::from_str(&contents).map_err(|e| {
        Error::StoreUnavailable(format!("cannot parse catalog {}: {}", path.display(), e))
    })?;

    tracing::info!(
        "Loaded {} planned sessions from {:?}",
        sessions.len(),
        path
    );

    Ok(Catalog { sessions })
}

impl Catalog {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    /// Find a planned session by name
    pub fn find(&self, name: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Validate the catalog
    ///
    /// Returns a list of validation errors (empty if valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut session_names = HashSet::new();

        for session in &self.sessions {
            if session.name.trim().is_empty() {
                errors.push("Session with empty name".to_string());
            } else if !session_names.insert(session.name.as_str()) {
                errors.push(format!("Duplicate session name '{}'", session.name));
            }

            if session.exercises.is_empty() {
                errors.push(format!("Session '{}' has no exercises", session.name));
            }

            let names: HashSet<&str> = session.exercise_names().collect();
            let mut seen = HashSet::new();

            for exercise in &session.exercises {
                if exercise.name.trim().is_empty() {
                    errors.push(format!(
                        "Session '{}' has an exercise with empty name",
                        session.name
                    ));
                    continue;
                }
                if !seen.insert(exercise.name.as_str()) {
                    errors.push(format!(
                        "Session '{}' lists '{}' more than once",
                        session.name, exercise.name
                    ));
                }
                if exercise.planned_sets == 0 {
                    errors.push(format!(
                        "Session '{}': '{}' has zero planned sets",
                        session.name, exercise.name
                    ));
                }
                if let Some(partner) = &exercise.superset_with {
                    if !names.contains(partner.as_str()) {
                        errors.push(format!(
                            "Session '{}': '{}' supersets with unknown exercise '{}'",
                            session.name, exercise.name, partner
                        ));
                    }
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_day() -> Session {
        let mut row = Exercise::planned("Roing", 3, "60s");
        row.superset_with = Some("Benkpress med stong".into());
        Session::planned(
            "Overkropp",
            vec![
                Exercise::planned("Benkpress med stong", 3, "2 min"),
                Exercise::planned("Benkpress med manuala", 3, "2 min"),
                row,
            ],
        )
    }

    #[test]
    fn test_catalog_loads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.json");
        std::fs::write(&path, serde_json::to_string(&vec![bench_day()]).unwrap()).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.sessions.len(), 1);
        assert!(catalog.find("Overkropp").is_some());
        assert!(catalog.find("Bein").is_none());
    }

    #[test]
    fn test_missing_catalog_is_unavailable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_catalog(&temp_dir.path().join("nonexistent.json"));
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[test]
    fn test_corrupt_catalog_is_unavailable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(load_catalog(&path), Err(Error::StoreUnavailable(_))));
    }

    #[test]
    fn test_valid_catalog_has_no_errors() {
        let catalog = Catalog::new(vec![bench_day()]);
        let errors = catalog.validate();
        assert!(errors.is_empty(), "Unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_validation_reports_problems() {
        let mut day = bench_day();
        day.exercises[0].planned_sets = 0;
        day.exercises[2].superset_with = Some("Pullover".into());
        day.exercises.push(Exercise::planned("Roing", 2, ""));

        let catalog = Catalog::new(vec![day.clone(), day]);
        let errors = catalog.validate();

        assert!(errors.iter().any(|e| e.contains("zero planned sets")));
        assert!(errors.iter().any(|e| e.contains("unknown exercise 'Pullover'")));
        assert!(errors.iter().any(|e| e.contains("more than once")));
        assert!(errors.iter().any(|e| e.contains("Duplicate session name")));
    }
}
