//! Tracing subscriber setup.

use clap::ValueEnum;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Log line encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Install the global subscriber, filtered by `RUST_LOG`.
///
/// A second installation attempt logs a warning and leaves the existing
/// subscriber in place.
pub fn init_tracing(format: LogFormat) {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn repeated_initialisation_is_harmless() {
        init_tracing(LogFormat::Json);
        init_tracing(LogFormat::Pretty);
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    fn formats_parse_from_flags(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_str(raw, true), Ok(expected));
    }
}
