//! Structured logging initialisation for search callers.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::config::{LogFormat, LoggingConfig};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on the first call.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the
/// global state, even when their configuration differs. Embedders that
/// install their own subscriber should not call this at all; the search
/// engine only emits `tracing` events.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter expression is invalid
/// and [`TelemetryError::Subscriber`] when another global subscriber is
/// already installed.
pub fn initialise(config: &LoggingConfig) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

/// Parses the configured filter expression.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the expression is invalid.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.filter).map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn install_subscriber(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = filter(config)?;

    let builder = |directives: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(directives)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            // No colour codes outside interactive terminals.
            .with_ansi(io::stderr().is_terminal())
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format {
        LogFormat::Json => Box::new(builder(env_filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(env_filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn logging(filter: &str) -> LoggingConfig {
        LoggingConfig {
            filter: filter.to_owned(),
            ..LoggingConfig::default()
        }
    }

    #[rstest]
    #[case("info")]
    #[case("sas_engine=debug,sas_syntax=warn")]
    fn accepts_valid_filters(#[case] directives: &str) {
        assert!(filter(&logging(directives)).is_ok());
    }

    #[test]
    fn rejects_invalid_filters() {
        let error = filter(&logging("sas_engine=loud")).expect_err("invalid level");
        assert!(matches!(error, TelemetryError::Filter(_)));
        assert!(error.to_string().starts_with("invalid log filter"));
    }

    #[test]
    fn initialise_is_idempotent() {
        let config = LoggingConfig::default();
        initialise(&config).expect("first initialisation");
        initialise(&config).expect("second initialisation");
    }
}
