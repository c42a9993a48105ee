//! Network boundary to the Anthropic Messages API

mod http;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

pub use self::http::HttpTransport;
use crate::error::LlmError;
use crate::protocol::{AnthropicRequest, AnthropicResponse, AnthropicStreamEvent};

/// Ordered, typed stream events for a single streamed response
pub type EventStream = Pin<Box<dyn Stream<Item = Result<AnthropicStreamEvent, LlmError>> + Send>>;

/// Sends wire requests and yields wire responses
///
/// The adapter never retries; failures surface as `LlmError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the complete response document
    async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, LlmError>;

    /// Send a request with streaming enabled
    async fn send_streaming(&self, request: &AnthropicRequest) -> Result<EventStream, LlmError>;
}
