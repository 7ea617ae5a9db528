//! Equivalence table for interchangeable exercises.
//!
//! Two exercises that are alternative executions of the same movement
//! (barbell vs. dumbbell bench, for instance) form an equivalence pair.
//! Completing one satisfies the other, and a session that lists both asks
//! the operator to pick one up front.

use crate::config::ExclusionConfig;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Pair used when no configuration overrides it
pub const DEFAULT_PAIRS: &[(&str, &str)] = &[("Benkpress med stong", "Benkpress med manuala")];

/// Cached default table - built once and reused across logging runs
static DEFAULT_TABLE: Lazy<EquivalenceTable> =
    Lazy::new(|| EquivalenceTable::from_pairs(DEFAULT_PAIRS.iter().copied()));

/// Get a reference to the cached default equivalence table
pub fn default_table() -> &'static EquivalenceTable {
    &DEFAULT_TABLE
}

/// Mapping from an exercise name to the names that substitute for it
#[derive(Clone, Debug, Default)]
pub struct EquivalenceTable {
    pairs: Vec<(String, String)>,
    counterparts: HashMap<String, Vec<String>>,
}

impl EquivalenceTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (a, b) in pairs {
            table.insert(a.into(), b.into());
        }
        table
    }

    pub fn from_config(config: &ExclusionConfig) -> Self {
        Self::from_pairs(config.pairs.iter().map(|[a, b]| (a.clone(), b.clone())))
    }

    fn insert(&mut self, a: String, b: String) {
        if a == b || self.pairs.iter().any(|(x, y)| (x, y) == (&a, &b) || (x, y) == (&b, &a)) {
            return;
        }
        self.counterparts.entry(a.clone()).or_default().push(b.clone());
        self.counterparts.entry(b.clone()).or_default().push(a.clone());
        self.pairs.push((a, b));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Names that are satisfied once `name` has been performed
    pub fn counterparts(&self, name: &str) -> &[String] {
        self.counterparts.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pairs whose members both appear in `names`, in table order
    pub fn pairs_present<'a, I>(&self, names: I) -> Vec<(&str, &str)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = names.into_iter().collect();
        self.pairs
            .iter()
            .filter(|(a, b)| present.contains(a.as_str()) && present.contains(b.as_str()))
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect()
    }
}

/// Exercises already satisfied during one logging run
#[derive(Clone, Debug, Default)]
pub struct CompletionState {
    completed: HashSet<String>,
}

impl CompletionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, name: &str) -> bool {
        self.completed.contains(name)
    }

    pub fn mark(&mut self, name: impl Into<String>) {
        self.completed.insert(name.into());
    }

    /// Mark every counterpart of a just-logged exercise as satisfied
    pub fn resolve_after(&mut self, table: &EquivalenceTable, logged: &str) {
        for other in table.counterparts(logged) {
            tracing::debug!("{} satisfies {}, skipping it", logged, other);
            self.completed.insert(other.clone());
        }
    }

    /// Record the operator's pick from an exclusive pair; the other member is skipped
    pub fn apply_choice(&mut self, pair: (&str, &str), picked: &str) {
        let skipped = if picked == pair.0 { pair.1 } else { pair.0 };
        tracing::debug!("Picked {} over {}", picked, skipped);
        self.completed.insert(skipped.to_string());
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STONG: &str = "Benkpress med stong";
    const MANUALA: &str = "Benkpress med manuala";

    #[test]
    fn test_default_table_links_bench_variants() {
        let table = default_table();
        assert_eq!(table.counterparts(STONG), [MANUALA.to_string()]);
        assert_eq!(table.counterparts(MANUALA), [STONG.to_string()]);
    }

    #[test]
    fn test_resolve_after_marks_counterpart() {
        let mut state = CompletionState::new();
        state.resolve_after(default_table(), STONG);

        assert!(state.is_completed(MANUALA));
        assert!(!state.is_completed(STONG));
    }

    #[test]
    fn test_unpaired_name_marks_nothing() {
        let mut state = CompletionState::new();
        state.resolve_after(default_table(), "Knebøy");
        assert!(state.is_empty());
    }

    #[test]
    fn test_pairs_present_requires_both_members() {
        let table = default_table();
        assert!(table.pairs_present([STONG, "Roing"]).is_empty());
        assert_eq!(
            table.pairs_present([MANUALA, "Roing", STONG]),
            vec![(STONG, MANUALA)]
        );
    }

    #[test]
    fn test_apply_choice_skips_other_member() {
        let mut state = CompletionState::new();
        state.apply_choice((STONG, MANUALA), MANUALA);

        assert!(state.is_completed(STONG));
        assert!(!state.is_completed(MANUALA));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_configured_pairs_replace_default() {
        let config = ExclusionConfig {
            pairs: vec![["Pull-up".into(), "Lat pulldown".into()]],
        };
        let table = EquivalenceTable::from_config(&config);

        assert!(table.counterparts(STONG).is_empty());
        assert_eq!(table.counterparts("Lat pulldown"), ["Pull-up".to_string()]);
    }

    #[test]
    fn test_duplicate_and_self_pairs_ignored() {
        let table = EquivalenceTable::from_pairs([("A", "B"), ("B", "A"), ("C", "C")]);
        assert_eq!(table.counterparts("A").len(), 1);
        assert!(table.counterparts("C").is_empty());
        assert_eq!(table.pairs_present(["A", "B", "C"]).len(), 1);
    }

    #[test]
    fn test_name_in_two_pairs_marks_both() {
        let table = EquivalenceTable::from_pairs([("Squat", "Leg press"), ("Squat", "Hack squat")]);
        let mut state = CompletionState::new();
        state.resolve_after(&table, "Squat");

        assert!(state.is_completed("Leg press"));
        assert!(state.is_completed("Hack squat"));
    }
}
