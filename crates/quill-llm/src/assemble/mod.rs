//! Anthropic responses to canonical responses
//!
//! A complete response document maps directly; a streamed response goes
//! through [`StreamAssembler`], which merges per-block fragments and hands
//! each fragment to an optional caller callback first.

mod stream;

pub use stream::{AssemblyState, StreamAssembler, assemble_stream};

use crate::protocol::{AnthropicResponse, AnthropicResponseBlock};
use crate::types::{FinishReason, GenerateResponse, Message, Part, ResponseChunk, Role, ToolRequest, Usage};

/// Per-chunk callback invoked synchronously for each streamed delta
///
/// Returning an error aborts assembly.
pub type ChunkCallback<'a> = dyn FnMut(&ResponseChunk) -> anyhow::Result<()> + Send + 'a;

/// Convert a complete (non-streaming) response document
pub fn assemble_response(response: AnthropicResponse) -> GenerateResponse {
    let content: Vec<Part> = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicResponseBlock::Text { text } => Some(Part::Text { text }),
            AnthropicResponseBlock::ToolUse { id, name, input } => Some(Part::ToolRequest(ToolRequest {
                reference: Some(id),
                name,
                input,
            })),
            AnthropicResponseBlock::Other => None,
        })
        .collect();

    let finish_reason = FinishReason::from_stop_reason(response.stop_reason.as_deref());

    tracing::debug!(
        id = %response.id,
        model = %response.model,
        parts = content.len(),
        ?finish_reason,
        "assembled response"
    );

    GenerateResponse {
        finish_reason,
        finish_message: response.stop_sequence,
        message: Message::new(Role::Model, content),
        usage: response
            .usage
            .map(|usage| Usage::new(usage.input_tokens, usage.output_tokens)),
    }
}
