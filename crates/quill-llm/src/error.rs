use thiserror::Error;

use crate::types::GenerateResponse;

/// Errors that can occur while translating, sending, or assembling a request
#[derive(Debug, Error)]
pub enum LlmError {
    /// Logical model name has no catalog entry
    #[error("model not found: {model}")]
    UnknownModel { model: String },

    /// `data:` URI without a comma separating header and payload
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    /// Payload marked as base64 could not be decoded
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Stream delta or stop event addressed a content block that was never started
    #[error("unexpected stream event for content block {index}")]
    UnexpectedDelta { index: u32 },

    /// `content_block_start` reused an index that was already started
    #[error("content block {index} started twice")]
    DuplicateBlock { index: u32 },

    /// Stream ended before the terminal event was observed
    #[error("stream ended before message_stop")]
    IncompleteStream,

    /// Concatenated tool-call argument fragments are not valid JSON
    ///
    /// Carries the degraded response, whose finish reason is forced to `other`.
    #[error("malformed tool arguments for content block {index}: {message}")]
    MalformedToolArguments {
        /// Content block index of the broken tool call
        index: u32,
        /// Parser error message
        message: String,
        /// Response assembled despite the broken tool call
        response: Box<GenerateResponse>,
    },

    /// Network, authentication, or provider-side failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Caller-supplied chunk callback failed
    #[error("chunk callback failed: {0}")]
    Callback(#[source] anyhow::Error),

    /// Caller cancelled the request mid-flight
    #[error("request cancelled")]
    Cancelled,

    /// Plugin options are unusable (e.g. no API key)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Plugin `init` was called more than once
    #[error("plugin already initialized")]
    AlreadyInitialized,

    /// Plugin used before `init`
    #[error("plugin not initialized")]
    NotInitialized,

    /// Wire payload could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether the transport collaborator may reasonably retry this request
    ///
    /// Nothing is retried internally; the flag is advisory.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Degraded response attached to a `MalformedToolArguments` failure
    pub fn into_partial_response(self) -> Option<GenerateResponse> {
        match self {
            Self::MalformedToolArguments { response, .. } => Some(*response),
            _ => None,
        }
    }
}
