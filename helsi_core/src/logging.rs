//! Tracing setup shared by the interactive CLI and the HTTP server.
//!
//! All log output goes to stderr; stdout belongs to prompts and reports.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "HELSI_LOG";

/// How chatty the process should be when no filter is set in the environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// Interactive use: warnings and errors only
    Quiet,
    /// Long-running server: request-level info
    Server,
    /// `--verbose`: everything from our crates
    Debug,
}

impl Verbosity {
    fn default_directives(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Server => "info,tower_http=info",
            Verbosity::Debug => "warn,helsi_core=debug,helsi_cli=debug",
        }
    }
}

/// Build the filter: `HELSI_LOG`, then `RUST_LOG`, then the verbosity default
fn filter_for(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directives()))
}

/// Install the global subscriber
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init(verbosity: Verbosity) {
    let installed = tracing_subscriber::registry()
        .with(filter_for(verbosity))
        .with(
            fmt::layer()
                .compact()
                .with_target(verbosity == Verbosity::Debug)
                .with_writer(std::io::stderr),
        )
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_defaults() {
        assert_eq!(Verbosity::Quiet.default_directives(), "warn");
        assert!(Verbosity::Debug.default_directives().contains("helsi_core=debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(Verbosity::Quiet);
        init(Verbosity::Debug);
    }
}
