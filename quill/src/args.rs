use std::path::PathBuf;

use clap::Parser;

/// Quill: prompt Claude models through the Anthropic Messages API
#[derive(Debug, Parser)]
#[command(name = "quill", about = "Send a prompt to an Anthropic model")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "QUILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logical model name, e.g. `claude-sonnet-4` or `anthropic/claude-3-5-haiku`
    #[arg(short, long, env = "QUILL_MODEL")]
    pub model: Option<String>,

    /// System instructions sent ahead of the prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Print text as it arrives instead of waiting for the full response
    #[arg(long)]
    pub stream: bool,

    /// Maximum number of output tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// List registered models and exit
    #[arg(long)]
    pub list_models: bool,

    /// Prompt text
    #[arg(required_unless_present = "list_models")]
    pub prompt: Option<String>,
}
