//! Wire shapes for the Anthropic Messages API
//!
//! These mirror the provider's JSON one to one and never leave the crate
//! boundary; translation and assembly convert them to canonical types.

use serde::{Deserialize, Serialize};

// -- Outbound --

/// Body of `POST /messages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicRequest {
    /// Concrete version id, never a logical name
    pub model: String,
    /// Mandatory on this API
    pub max_tokens: u32,
    /// Hoisted system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Set only for streamed calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<AnthropicToolChoice>,
}

/// One conversation turn; `role` is `user` or `assistant`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: Vec<AnthropicContentBlock>,
}

/// Outbound content block, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text {
        text: String,
    },
    Image {
        source: AnthropicSource,
    },
    /// PDFs, plain text and any other non-image media
    Document {
        source: AnthropicSource,
    },
    /// Echo of an earlier assistant tool call
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Output of a tool, answering the call with `tool_use_id`
    ToolResult {
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Where an image or document payload comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicSource {
    /// Bare base64, no `data:` header
    Base64 { media_type: String, data: String },
    /// Fetched by the provider
    Url { url: String },
    /// UTF-8 document body; `media_type` is always `text/plain`
    Text { media_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema; the API rejects tools without one
    pub input_schema: serde_json::Value,
}

/// `{"type": "auto" | "any" | "none" | "tool", "name"?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicToolChoice {
    #[serde(rename = "type")]
    pub choice_type: String,
    /// Present only when `choice_type` is `tool`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// -- Unary reply --

/// Complete reply to a non-streamed call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    /// `"message"`
    #[serde(rename = "type")]
    pub response_type: String,
    /// `"assistant"`
    pub role: String,
    pub content: Vec<AnthropicResponseBlock>,
    pub model: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Matched sequence when `stop_reason` is `stop_sequence`
    #[serde(default)]
    pub stop_sequence: Option<String>,
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Thinking, server-side tools and anything newer
    #[serde(other)]
    Other,
}

/// Token counts
///
/// Both default to zero because `message_delta` only reports output tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

// -- Server-sent events --

/// One decoded SSE frame, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamEvent {
    MessageStart {
        message: AnthropicStreamMessage,
    },
    ContentBlockStart {
        index: u32,
        content_block: AnthropicStreamContentBlock,
    },
    ContentBlockDelta {
        index: u32,
        delta: AnthropicStreamDelta,
    },
    ContentBlockStop {
        index: u32,
    },
    /// Carries the stop reason and running output token count
    MessageDelta {
        delta: AnthropicMessageDelta,
        #[serde(default)]
        usage: Option<AnthropicUsage>,
    },
    /// Terminal frame
    MessageStop,
    Ping,
    /// Failure reported after the stream opened
    Error {
        error: AnthropicErrorDetail,
    },
}

/// Message header sent in `message_start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicStreamMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    /// Input tokens are known up front
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

/// Opening payload of a content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamContentBlock {
    /// `text` is normally empty but may already hold content
    Text {
        #[serde(default)]
        text: String,
    },
    /// `input` is normally `{}`; arguments follow as JSON fragments
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamDelta {
    TextDelta {
        text: String,
    },
    /// Fragment of the tool arguments; only the concatenation is valid JSON
    InputJsonDelta {
        partial_json: String,
    },
    /// Thinking and signature deltas
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnthropicMessageDelta {
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub stop_sequence: Option<String>,
}

// -- Failures --

/// Body returned with a non-2xx status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicErrorResponse {
    /// `"error"`
    #[serde(rename = "type")]
    pub error_type: String,
    pub error: AnthropicErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicErrorDetail {
    /// Machine-readable kind, e.g. `overloaded_error`
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
