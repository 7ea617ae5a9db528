//! Error types for the helsi_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for helsi_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Catalog or history could not be read
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Operator cancelled while input was being collected
    #[error("Input aborted")]
    InputAborted,

    /// Input could not be parsed and the retry policy is exhausted
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Writing the history failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),
}
