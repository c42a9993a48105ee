//! Canonical request to Anthropic wire request

use crate::catalog::Catalog;
use crate::codec::{self, DecodedData};
use crate::error::LlmError;
use crate::protocol::{
    AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicSource, AnthropicTool, AnthropicToolChoice,
};
use crate::types::{GenerateRequest, Message, Part, Role, ToolChoice, ToolDefinition, ToolRequest, ToolResponse};

/// Default max tokens when not specified (Anthropic requires this field)
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Builds wire requests from canonical requests
///
/// Pure data transformation: no network activity happens here.
#[derive(Debug, Clone, Copy)]
pub struct RequestTranslator<'a> {
    catalog: &'a Catalog,
    default_max_tokens: u32,
}

impl<'a> RequestTranslator<'a> {
    /// Create a translator resolving model names against `catalog`
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Override the `max_tokens` used when the request leaves it unset
    #[must_use]
    pub const fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        if max_tokens > 0 {
            self.default_max_tokens = max_tokens;
        }
        self
    }

    /// Translate a canonical request for the given logical model
    ///
    /// Model resolution happens first, so an unknown model fails before any
    /// message content is touched.
    pub fn translate(&self, request: &GenerateRequest, model: &str) -> Result<AnthropicRequest, LlmError> {
        let version = self.catalog.resolve_version(model)?;

        let mut system_parts = Vec::new();
        let mut messages = Vec::with_capacity(request.messages.len());

        for message in &request.messages {
            if message.role == Role::System {
                system_parts.push(message.text());
            } else {
                messages.push(message_to_anthropic(message)?);
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n"))
        };

        let config = &request.config;
        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(tool_to_anthropic).collect())
        };

        tracing::debug!(
            model = %version,
            turns = messages.len(),
            has_system = system.is_some(),
            "translated request"
        );

        Ok(AnthropicRequest {
            model: version,
            max_tokens: config
                .max_output_tokens
                .filter(|&n| n > 0)
                .unwrap_or(self.default_max_tokens),
            system,
            messages,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            stop_sequences: config.stop_sequences.clone().filter(|stops| !stops.is_empty()),
            stream: None,
            tools,
            tool_choice: request.tool_choice.map(tool_choice_to_anthropic),
        })
    }
}

/// Convert a non-system message to a wire turn
fn message_to_anthropic(message: &Message) -> Result<AnthropicMessage, LlmError> {
    let role = match message.role {
        Role::Model => "assistant",
        // Tool results are addressed back to the assistant from the user side
        Role::User | Role::Tool | Role::System => "user",
    };

    let content = message
        .content
        .iter()
        .map(part_to_anthropic)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnthropicMessage {
        role: role.to_owned(),
        content,
    })
}

/// Convert a single content part to a wire block
fn part_to_anthropic(part: &Part) -> Result<AnthropicContentBlock, LlmError> {
    match part {
        Part::Text { text } => Ok(AnthropicContentBlock::Text { text: text.clone() }),
        Part::Media { content_type, url } => {
            if is_remote_url(url) {
                return Ok(remote_block(content_type.as_deref(), url));
            }
            let decoded = codec::decode_part(content_type.as_deref(), url)?;
            Ok(inline_block(decoded))
        }
        Part::Data { content_type, data } => {
            let decoded = codec::decode_part(content_type.as_deref(), data)?;
            Ok(inline_block(decoded))
        }
        Part::ToolRequest(request) => Ok(tool_request_to_anthropic(request)),
        Part::ToolResponse(response) => Ok(tool_response_to_anthropic(response)),
    }
}

fn is_remote_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Remote media is fetched by the provider
fn remote_block(content_type: Option<&str>, url: &str) -> AnthropicContentBlock {
    let source = AnthropicSource::Url { url: url.to_owned() };
    match content_type {
        Some(ct) if ct.starts_with("application/pdf") => AnthropicContentBlock::Document { source },
        _ => AnthropicContentBlock::Image { source },
    }
}

/// Inline media becomes an image or document block depending on its type
fn inline_block(decoded: DecodedData) -> AnthropicContentBlock {
    let media_type = decoded.essence();

    if media_type.starts_with("image/") {
        return AnthropicContentBlock::Image {
            source: AnthropicSource::Base64 {
                data: decoded.to_base64(),
                media_type,
            },
        };
    }

    let data = if media_type == "text/plain" {
        match String::from_utf8(decoded.data) {
            Ok(text) => {
                return AnthropicContentBlock::Document {
                    source: AnthropicSource::Text { media_type, data: text },
                };
            }
            Err(e) => {
                tracing::debug!("text/plain part is not valid UTF-8, sending as base64");
                e.into_bytes()
            }
        }
    } else {
        decoded.data
    };

    AnthropicContentBlock::Document {
        source: AnthropicSource::Base64 {
            data: codec::encode_base64(&data),
            media_type,
        },
    }
}

fn tool_request_to_anthropic(request: &ToolRequest) -> AnthropicContentBlock {
    let input = if request.input.is_null() {
        serde_json::json!({})
    } else {
        request.input.clone()
    };

    AnthropicContentBlock::ToolUse {
        id: request.call_id().to_owned(),
        name: request.name.clone(),
        input,
    }
}

fn tool_response_to_anthropic(response: &ToolResponse) -> AnthropicContentBlock {
    let content = match &response.output {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    };

    AnthropicContentBlock::ToolResult {
        tool_use_id: response.call_id().to_owned(),
        content,
        is_error: None,
    }
}

fn tool_to_anthropic(tool: &ToolDefinition) -> AnthropicTool {
    AnthropicTool {
        name: tool.name.clone(),
        description: tool.description.clone(),
        input_schema: tool
            .input_schema
            .clone()
            .unwrap_or_else(|| serde_json::json!({"type": "object"})),
    }
}

fn tool_choice_to_anthropic(choice: ToolChoice) -> AnthropicToolChoice {
    let choice_type = match choice {
        ToolChoice::Auto => "auto",
        ToolChoice::Required => "any",
        ToolChoice::None => "none",
    };

    AnthropicToolChoice {
        choice_type: choice_type.to_owned(),
        name: None,
    }
}
