use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User turn
    User,
    /// Model (assistant) turn
    Model,
    /// Tool results returned to the model
    Tool,
}

/// Message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Ordered content parts
    pub content: Vec<Part>,
}

impl Message {
    /// Create a message from a role and its parts
    pub const fn new(role: Role, content: Vec<Part>) -> Self {
        Self { role, content }
    }

    /// Create a single-part system message
    pub fn system_text(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![Part::text(text)])
    }

    /// Create a single-part user message
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Create a single-part model message
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    /// Concatenated text of all text parts, in order
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool requests contained in this message, in order
    pub fn tool_requests(&self) -> impl Iterator<Item = &ToolRequest> {
        self.content.iter().filter_map(|part| match part {
            Part::ToolRequest(request) => Some(request),
            _ => None,
        })
    }
}

/// One tagged unit of message content
///
/// The variant alone decides how a part is handled; payloads are never
/// sniffed to guess a kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Plain text
    Text {
        /// The text string
        text: String,
    },
    /// Media given as a `data:` URI, bare base64 payload, or remote URL
    Media {
        /// Declared content type (e.g. "image/png")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        /// Data URI, base64 payload, or `http(s)` URL
        url: String,
    },
    /// Arbitrary data given as a `data:` URI or bare base64 payload
    Data {
        /// Declared content type
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        /// Data URI or base64 payload
        data: String,
    },
    /// Tool invocation requested by the model
    ToolRequest(ToolRequest),
    /// Result of a tool invocation
    ToolResponse(ToolResponse),
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a media part with an explicit content type
    pub fn media(content_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Media {
            content_type: Some(content_type.into()),
            url: url.into(),
        }
    }
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Call identifier used to correlate the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Tool name
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub input: Value,
}

impl ToolRequest {
    /// Identifier sent on the wire: the reference, or the tool name when absent
    pub fn call_id(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.name)
    }
}

/// Tool output returned to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Identifier of the call this responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Tool name
    pub name: String,
    /// Tool output
    #[serde(default)]
    pub output: Value,
}

impl ToolResponse {
    /// Identifier sent on the wire: the reference, or the tool name when absent
    pub fn call_id(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.name)
    }
}
