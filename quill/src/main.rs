#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::io::Write as _;

use args::Args;
use clap::Parser;
use quill_config::{Config, CustomModelConfig};
use quill_llm::types::GenerationConfig;
use quill_llm::{
    AnthropicModel, AnthropicOptions, AnthropicPlugin, GenerateRequest, GenerateResponse, Message, ModelInfo,
    ModelSupports, ResponseChunk,
};
use tokio_util::sync::CancellationToken;

/// Model used when neither the command line nor the config names one
const FALLBACK_MODEL: &str = "claude-sonnet-4";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    quill_telemetry::init(&config.logging)?;

    let plugin = build_plugin(&config)?;

    if args.list_models {
        for name in plugin.list_models()? {
            println!("{name}");
        }
        return Ok(());
    }

    let model_name = args
        .model
        .clone()
        .or_else(|| config.default_model.clone())
        .unwrap_or_else(|| FALLBACK_MODEL.to_owned());

    let Some(model) = plugin.model(&model_name) else {
        anyhow::bail!(
            "unknown model `{model_name}`; registered models: {}",
            plugin.list_models()?.join(", ")
        );
    };

    let cancel = CancellationToken::new();
    let cancel_on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling request");
            cancel_on_interrupt.cancel();
        }
    });

    let request = build_request(&args);
    let response = run(&model, &request, args.stream, &cancel).await?;

    if let Some(usage) = response.usage {
        tracing::info!(
            model = %model.qualified_name(),
            finish_reason = ?response.finish_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "generation complete"
        );
    }

    Ok(())
}

/// Initialize the plugin and register configured models
fn build_plugin(config: &Config) -> anyhow::Result<AnthropicPlugin> {
    let plugin = AnthropicPlugin::new(AnthropicOptions {
        api_key: config.anthropic.api_key.clone(),
        base_url: config.anthropic.base_url.clone(),
        default_max_tokens: Some(config.anthropic.default_max_tokens),
    });
    plugin.init()?;

    for (name, model) in &config.models {
        plugin.define_model(name, Some(model_info(model)))?;
    }

    Ok(plugin)
}

fn model_info(model: &CustomModelConfig) -> ModelInfo {
    ModelInfo {
        label: model.label.clone(),
        supports: ModelSupports {
            multiturn: model.multiturn,
            tools: model.tools,
            system_role: model.system_role,
            media: model.media,
        },
        versions: model.versions.clone(),
    }
}

fn build_request(args: &Args) -> GenerateRequest {
    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(Message::system_text(system.as_str()));
    }
    messages.push(Message::user_text(args.prompt.clone().unwrap_or_default()));

    let mut request = GenerateRequest::new(messages);
    request.config = GenerationConfig {
        max_output_tokens: args.max_tokens,
        temperature: args.temperature,
        ..GenerationConfig::default()
    };
    request
}

async fn run(
    model: &AnthropicModel,
    request: &GenerateRequest,
    stream: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<GenerateResponse> {
    if !stream {
        let response = model.generate(request, None, cancel).await?;
        println!("{}", response.text());
        return Ok(response);
    }

    let stdout = std::io::stdout();
    let mut print_chunk = |chunk: &ResponseChunk| -> anyhow::Result<()> {
        let mut out = stdout.lock();
        out.write_all(chunk.text().as_bytes())?;
        out.flush()?;
        Ok(())
    };

    let response = model.generate(request, Some(&mut print_chunk), cancel).await?;
    println!();
    Ok(response)
}
