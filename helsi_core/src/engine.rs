//! Session completion engine.
//!
//! Turns a planned session into a logged one:
//! - Stamp the logging time
//! - Resolve exclusive pairs up front (operator picks one member)
//! - Collect reps and weight for every planned set, in session order
//! - Skip exercises an earlier choice or counterpart already satisfied
//!
//! Nothing is persisted here. The caller appends the returned session to the
//! history only when the whole run succeeded.

use crate::exclusion::{CompletionState, EquivalenceTable};
use crate::input::SetCollector;
use crate::{Error, Result, Session};
use chrono::{DateTime, Utc};

/// Where a logging run currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionPhase {
    Planned,
    ChoicePending,
    AwaitingInput { exercise: usize },
    Complete,
    Aborted,
}

/// One logging run over a single planned session
pub struct CompletionRun<'t> {
    table: &'t EquivalenceTable,
    state: CompletionState,
    phase: CompletionPhase,
    session: Session,
}

impl<'t> CompletionRun<'t> {
    /// Start a run; the session is stamped with `now`
    pub fn new(planned: &Session, table: &'t EquivalenceTable, now: DateTime<Utc>) -> Self {
        let mut session = planned.clone();
        session.date = Some(now);
        for exercise in &mut session.exercises {
            exercise.reps.clear();
            exercise.weights.clear();
        }

        Self {
            table,
            state: CompletionState::new(),
            phase: CompletionPhase::Planned,
            session,
        }
    }

    pub fn phase(&self) -> CompletionPhase {
        self.phase
    }

    /// Drive the run to completion, consuming it
    pub fn run(mut self, collector: &mut SetCollector<'_>) -> Result<Session> {
        match self.drive(collector) {
            Ok(()) => {
                self.set_phase(CompletionPhase::Complete);
                tracing::info!(
                    "Completed {} ({} exercises skipped)",
                    self.session.name,
                    self.state.len()
                );
                Ok(self.session)
            }
            Err(e) => {
                self.set_phase(CompletionPhase::Aborted);
                match e {
                    Error::InputAborted => {
                        tracing::info!("Logging {} cancelled by operator", self.session.name)
                    }
                    _ => tracing::warn!("Logging {} aborted: {}", self.session.name, e),
                }
                Err(e)
            }
        }
    }

    fn drive(&mut self, collector: &mut SetCollector<'_>) -> Result<()> {
        self.resolve_choices(collector)?;

        for index in 0..self.session.exercises.len() {
            let name = self.session.exercises[index].name.clone();
            if self.state.is_completed(&name) {
                tracing::debug!("Skipping {}, already satisfied", name);
                continue;
            }

            self.set_phase(CompletionPhase::AwaitingInput { exercise: index });
            let exercise = &mut self.session.exercises[index];

            for set in 1..=exercise.planned_sets {
                let reps = collector.reps(&exercise.name, set)?;
                let weight = collector.weight(&exercise.name, set)?;
                exercise.reps.push(reps);
                exercise.weights.push(weight);
            }

            if let Some(partner) = &exercise.superset_with {
                collector.notify(&format!("Proceed to superset exercise: {}", partner))?;
            }

            self.state.resolve_after(self.table, &name);
        }

        Ok(())
    }

    fn resolve_choices(&mut self, collector: &mut SetCollector<'_>) -> Result<()> {
        let pairs = self.table.pairs_present(self.session.exercise_names());
        if pairs.is_empty() {
            return Ok(());
        }

        self.set_phase(CompletionPhase::ChoicePending);
        for (a, b) in pairs {
            // A previous choice may already have settled this pair
            if self.state.is_completed(a) || self.state.is_completed(b) {
                continue;
            }
            let title = format!("Choose between {} and {}:", a, b);
            let picked = match collector.choose(&title, &[a, b])? {
                0 => a,
                _ => b,
            };
            self.state.apply_choice((a, b), picked);
        }
        Ok(())
    }

    fn set_phase(&mut self, phase: CompletionPhase) {
        tracing::debug!("{}: {:?} -> {:?}", self.session.name, self.phase, phase);
        self.phase = phase;
    }
}

/// Log one planned session end to end
///
/// Fails with `InputAborted` when the operator cancels; partial input is
/// discarded.
pub fn complete_session(
    planned: &Session,
    table: &EquivalenceTable,
    collector: &mut SetCollector<'_>,
    now: DateTime<Utc>,
) -> Result<Session> {
    if planned.exercises.is_empty() {
        return Err(Error::CatalogValidation(format!(
            "Session '{}' has no exercises to log",
            planned.name
        )));
    }
    CompletionRun::new(planned, table, now).run(collector)
}
