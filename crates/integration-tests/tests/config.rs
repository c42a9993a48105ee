mod harness;

use std::io::Write as _;

use harness::mock_anthropic::{MockAnthropic, Scenario};
use quill_config::Config;
use quill_llm::{AnthropicOptions, AnthropicPlugin, GenerateRequest, Message, ModelInfo, ModelSupports};
use tokio_util::sync::CancellationToken;

fn plugin_from_config(config: &Config) -> AnthropicPlugin {
    let plugin = AnthropicPlugin::new(AnthropicOptions {
        api_key: config.anthropic.api_key.clone(),
        base_url: config.anthropic.base_url.clone(),
        default_max_tokens: Some(config.anthropic.default_max_tokens),
    });
    plugin.init().unwrap();

    for (name, model) in &config.models {
        let info = ModelInfo {
            label: model.label.clone(),
            supports: ModelSupports::MULTIMODAL,
            versions: model.versions.clone(),
        };
        plugin.define_model(name, Some(info)).unwrap();
    }

    plugin
}

#[tokio::test]
async fn configured_model_and_limits_reach_the_wire() {
    let mock = MockAnthropic::start(Scenario::Text(vec!["configured"])).await.unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
default_model = "pinned-haiku"

[anthropic]
api_key = "sk-ant-from-config"
base_url = "{base_url}"
default_max_tokens = 300

[models.pinned-haiku]
label = "Pinned Haiku"
versions = ["claude-3-5-haiku-20241022"]
"#,
        base_url = mock.base_url()
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let plugin = plugin_from_config(&config);

    let model_name = config.default_model.as_deref().unwrap();
    let model = plugin.model(model_name).unwrap();

    let response = model
        .generate(
            &GenerateRequest::new(vec![Message::user_text("Hi")]),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.text(), "configured");

    let sent = &mock.requests()[0];
    assert_eq!(sent.api_key.as_deref(), Some("sk-ant-from-config"));
    assert_eq!(sent.body["model"], "claude-3-5-haiku-20241022");
    assert_eq!(sent.body["max_tokens"], 300);
}
