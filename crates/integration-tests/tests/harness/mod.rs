#![allow(dead_code)]

pub mod mock_anthropic;

use quill_llm::{AnthropicOptions, AnthropicPlugin};
use secrecy::SecretString;

use self::mock_anthropic::MockAnthropic;

/// API key the mock expects on every request
pub const TEST_API_KEY: &str = "sk-ant-test-key";

/// Initialized plugin pointed at the mock server
pub fn plugin_for(mock: &MockAnthropic) -> AnthropicPlugin {
    let plugin = AnthropicPlugin::new(AnthropicOptions {
        api_key: Some(SecretString::from(TEST_API_KEY)),
        base_url: Some(mock.base_url()),
        default_max_tokens: None,
    });
    plugin.init().expect("plugin initializes");
    plugin
}
