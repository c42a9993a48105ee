#![allow(clippy::must_use_candidate)]

pub mod anthropic;
mod env;
mod loader;
pub mod logging;
pub mod models;

use indexmap::IndexMap;
use serde::Deserialize;

pub use anthropic::AnthropicConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use models::CustomModelConfig;

/// Top-level Quill configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model used when none is given on the command line
    #[serde(default)]
    pub default_model: Option<String>,
    /// Anthropic plugin settings
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    /// Additional models keyed by logical name
    #[serde(default)]
    pub models: IndexMap<String, CustomModelConfig>,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.default_model.is_none());
        assert!(config.anthropic.api_key.is_none());
        assert_eq!(config.anthropic.default_max_tokens, 4096);
        assert!(config.models.is_empty());
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn full_config_parses() {
        let config: Config = toml::from_str(
            r#"
            default_model = "claude-sonnet-4"

            [anthropic]
            api_key = "sk-ant-123"
            base_url = "http://localhost:9000/v1"
            default_max_tokens = 1024

            [models.pinned-haiku]
            label = "Pinned Haiku"
            versions = ["claude-3-5-haiku-20241022"]

            [models.bare]
            label = "Bare"

            [logging]
            filter = "quill=debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_model.as_deref(), Some("claude-sonnet-4"));
        assert_eq!(
            config.anthropic.api_key.as_ref().map(|key| key.expose_secret()),
            Some("sk-ant-123")
        );
        assert_eq!(
            config.anthropic.base_url.as_ref().map(url::Url::as_str),
            Some("http://localhost:9000/v1")
        );
        assert_eq!(config.anthropic.default_max_tokens, 1024);

        let names: Vec<&str> = config.models.keys().map(String::as_str).collect();
        assert_eq!(names, ["pinned-haiku", "bare"]);
        assert_eq!(config.models["pinned-haiku"].versions, ["claude-3-5-haiku-20241022"]);
        assert!(config.models["bare"].versions.is_empty());
        assert!(config.models["bare"].media);

        assert_eq!(config.logging.filter, "quill=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = toml::from_str::<Config>("[anthropic]\nmodel = \"x\"").unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
