//! # Telemetry
//!
//! Tracing subscriber setup.

use crate::settings::LoggingSettings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the filter: `RUST_LOG` when set, otherwise the configured
/// directives, otherwise `info`.
#[must_use]
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(
    settings: &LoggingSettings,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(settings));
    if settings.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directives_fall_back() {
        let settings = LoggingSettings {
            filter: "=[=".into(),
            json: false,
        };
        let _ = env_filter(&settings);
    }

    #[test]
    fn second_init_fails() {
        let settings = LoggingSettings::default();
        let _ = init_tracing(&settings);
        assert!(init_tracing(&settings).is_err());
    }

    #[test]
    fn json_output_builds_subscriber() {
        let settings = LoggingSettings {
            json: true,
            ..LoggingSettings::default()
        };
        let _ = init_tracing(&settings);
        assert!(init_tracing(&settings).is_err());
    }
}
