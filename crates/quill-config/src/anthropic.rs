use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Anthropic plugin configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key; `ANTHROPIC_API_KEY` is consulted when absent
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// `max_tokens` sent when a request does not set one
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_max_tokens: default_max_tokens(),
        }
    }
}

const fn default_max_tokens() -> u32 {
    4096
}
