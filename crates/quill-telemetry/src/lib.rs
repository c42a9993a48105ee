//! Logging for Quill
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a text or
//! JSON `fmt` layer.

use quill_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber from configuration
///
/// `RUST_LOG`, when set and valid, takes precedence over the configured
/// filter. An invalid configured filter falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = build_filter(config);
    let directives = filter.to_string();
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
    tracing::debug!(filter = %directives, format = ?config.format, "logging initialized");
    Ok(())
}

/// Resolve the active filter
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!("invalid log filter `{}` ({e}), falling back to `info`", config.filter);
        EnvFilter::new("info")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(filter: &str) -> LoggingConfig {
        LoggingConfig {
            filter: filter.to_owned(),
            format: LogFormat::Text,
        }
    }

    #[test]
    fn configured_filter_applies_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            let filter = build_filter(&logging("quill_llm=debug"));
            assert_eq!(filter.to_string(), "quill_llm=debug");
        });
    }

    #[test]
    fn rust_log_overrides_configuration() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let filter = build_filter(&logging("debug"));
            assert_eq!(filter.to_string(), "warn");
        });
    }

    #[test]
    fn invalid_filter_falls_back_to_info() {
        temp_env::with_var_unset("RUST_LOG", || {
            let filter = build_filter(&logging("quill=[[nope"));
            assert_eq!(filter.to_string(), "info");
        });
    }

    #[test]
    fn subscriber_installs_once() {
        let config = LoggingConfig {
            filter: "debug".to_owned(),
            format: LogFormat::Json,
        };
        init(&config).unwrap();
        tracing::info!("visible through the installed subscriber");
        assert!(init(&config).is_err());
    }
}
