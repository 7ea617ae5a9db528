#![forbid(unsafe_code)]

//! Core domain model and business logic for the Helsi workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, sessions, improvements)
//! - Planned catalog loading and validation
//! - Exercise equivalence (exclusion) handling
//! - Session completion engine over an abstract input source
//! - Progression report
//! - Persistence (JSON history store, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod exclusion;
pub mod input;
pub mod engine;
pub mod progression;
pub mod store;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{load_catalog, Catalog};
pub use config::Config;
pub use exclusion::{CompletionState, EquivalenceTable};
pub use input::{InputSource, LineInput, RetryPolicy, ScriptedInput, SetCollector};
pub use engine::{complete_session, CompletionPhase, CompletionRun};
pub use progression::compute_progression;
pub use store::{JsonFileStore, SessionStore};
pub use export::export_csv;
