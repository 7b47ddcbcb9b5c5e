//! Logging setup using tracing.
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! overrides the default filter.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CliError, CliResult};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event, for log aggregation.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Initialize the tracing subscriber.
///
/// # Arguments
///
/// * `format` - Output format
/// * `filter` - Filter directive used when `RUST_LOG` is not set (e.g. "info")
pub fn init_logging(format: LogFormat, filter: &str) -> CliResult<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| CliError::Logging(format!("invalid log filter '{filter}': {e}")))?;

    let registry = tracing_subscriber::registry().with(filter_layer);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
    };
    result.map_err(|e| CliError::Logging(e.to_string()))?;

    tracing::debug!(filter = %filter, ?format, "Logging initialized");
    Ok(())
}

/// Initialize logging for tests (with simpler output).
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_does_not_panic() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_log_format_values() {
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("pretty", true), Ok(LogFormat::Pretty));
        assert!(LogFormat::from_str("xml", true).is_err());
    }
}
