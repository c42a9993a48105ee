use std::collections::{BTreeMap, BTreeSet};

use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::ChunkCallback;
use crate::error::LlmError;
use crate::protocol::{AnthropicStreamContentBlock, AnthropicStreamDelta, AnthropicStreamEvent};
use crate::types::{
    ChunkDelta, FinishReason, GenerateResponse, Message, Part, ResponseChunk, Role, ToolRequest, Usage,
};

/// Lifecycle of a streamed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// No event observed yet
    AwaitingStart,
    /// Events are being merged into slots
    Accumulating,
    /// `message_stop` seen; later events are ignored
    Finalized,
}

/// In-progress content block
#[derive(Debug)]
enum Slot {
    Text(String),
    ToolCall {
        id: String,
        name: String,
        initial_input: Value,
        arguments: String,
    },
    /// Block kind this adapter does not surface
    Ignored,
}

/// Merges Anthropic stream events into one canonical response
///
/// Exclusively owned by a single assembly; discarded once the response (or
/// an error) has been produced.
#[derive(Debug)]
pub struct StreamAssembler {
    state: AssemblyState,
    slots: BTreeMap<u32, Slot>,
    parts: BTreeMap<u32, Part>,
    /// Every index that has received a `content_block_start`
    started: BTreeSet<u32>,
    stop_reason: Option<String>,
    stop_sequence: Option<String>,
    usage: Option<(u32, u32)>,
    /// First tool call whose arguments failed to parse: (index, parser message)
    malformed: Option<(u32, String)>,
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAssembler {
    /// Create an assembler awaiting its first event
    pub const fn new() -> Self {
        Self {
            state: AssemblyState::AwaitingStart,
            slots: BTreeMap::new(),
            parts: BTreeMap::new(),
            started: BTreeSet::new(),
            stop_reason: None,
            stop_sequence: None,
            usage: None,
            malformed: None,
        }
    }

    /// Current lifecycle state
    pub const fn state(&self) -> AssemblyState {
        self.state
    }

    /// Whether the terminal event has been processed
    pub fn is_finalized(&self) -> bool {
        self.state == AssemblyState::Finalized
    }

    /// Apply one stream event
    ///
    /// For delta events, and for a text block that starts with non-empty
    /// text, the callback runs before the fragment is merged. A callback
    /// error aborts assembly.
    pub fn push(
        &mut self,
        event: AnthropicStreamEvent,
        callback: Option<&mut ChunkCallback<'_>>,
    ) -> Result<(), LlmError> {
        if self.state == AssemblyState::Finalized {
            tracing::trace!("ignoring stream event after message_stop");
            return Ok(());
        }
        self.state = AssemblyState::Accumulating;

        match event {
            AnthropicStreamEvent::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.usage = Some((usage.input_tokens, usage.output_tokens));
                }
                tracing::debug!(id = %message.id, model = %message.model, "stream started");
            }

            AnthropicStreamEvent::ContentBlockStart { index, content_block } => {
                if !self.started.insert(index) {
                    return Err(LlmError::DuplicateBlock { index });
                }
                let slot = match content_block {
                    AnthropicStreamContentBlock::Text { text } => {
                        if !text.is_empty() {
                            emit(index, ChunkDelta::Text { text: text.clone() }, callback)?;
                        }
                        Slot::Text(text)
                    }
                    AnthropicStreamContentBlock::ToolUse { id, name, input } => Slot::ToolCall {
                        id,
                        name,
                        initial_input: input,
                        arguments: String::new(),
                    },
                    AnthropicStreamContentBlock::Other => Slot::Ignored,
                };
                self.slots.insert(index, slot);
            }

            AnthropicStreamEvent::ContentBlockDelta { index, delta } => {
                let slot = self
                    .slots
                    .get_mut(&index)
                    .ok_or(LlmError::UnexpectedDelta { index })?;
                merge_delta(index, slot, delta, callback)?;
            }

            AnthropicStreamEvent::ContentBlockStop { index } => {
                let slot = self.slots.remove(&index).ok_or(LlmError::UnexpectedDelta { index })?;
                self.freeze(index, slot);
            }

            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                if delta.stop_reason.is_some() {
                    self.stop_reason = delta.stop_reason;
                    self.stop_sequence = delta.stop_sequence;
                }
                if let Some(usage) = usage {
                    let input_tokens = match self.usage {
                        Some((input, _)) if usage.input_tokens == 0 => input,
                        _ => usage.input_tokens,
                    };
                    self.usage = Some((input_tokens, usage.output_tokens));
                }
            }

            AnthropicStreamEvent::MessageStop => {
                let open = std::mem::take(&mut self.slots);
                if !open.is_empty() {
                    tracing::debug!(open = open.len(), "freezing content blocks left open at message_stop");
                }
                for (index, slot) in open {
                    self.freeze(index, slot);
                }
                self.state = AssemblyState::Finalized;
            }

            AnthropicStreamEvent::Ping => {}

            AnthropicStreamEvent::Error { error } => {
                tracing::warn!(error_type = %error.error_type, "provider error event mid-stream");
                return Err(LlmError::Transport(format!("{}: {}", error.error_type, error.message)));
            }
        }

        Ok(())
    }

    /// Produce the canonical response
    ///
    /// Fails with `IncompleteStream` unless `message_stop` was processed.
    pub fn finish(self) -> Result<GenerateResponse, LlmError> {
        if self.state != AssemblyState::Finalized {
            return Err(LlmError::IncompleteStream);
        }

        let mut finish_reason = FinishReason::from_stop_reason(self.stop_reason.as_deref());
        let finish_message = if self.stop_reason.as_deref() == Some("stop_sequence") {
            self.stop_sequence
        } else {
            None
        };

        if self.malformed.is_some() {
            finish_reason = FinishReason::Other;
        }

        let response = GenerateResponse {
            finish_reason,
            finish_message,
            message: Message::new(Role::Model, self.parts.into_values().collect()),
            usage: self.usage.map(|(input, output)| Usage::new(input, output)),
        };

        match self.malformed {
            Some((index, message)) => Err(LlmError::MalformedToolArguments {
                index,
                message,
                response: Box::new(response),
            }),
            None => Ok(response),
        }
    }

    /// Turn a closed slot into a part at its index position
    fn freeze(&mut self, index: u32, slot: Slot) {
        let part = match slot {
            Slot::Text(text) => Part::Text { text },
            Slot::ToolCall {
                id,
                name,
                initial_input,
                arguments,
            } => {
                let input = if arguments.trim().is_empty() {
                    if initial_input.is_null() {
                        serde_json::json!({})
                    } else {
                        initial_input
                    }
                } else {
                    match serde_json::from_str(&arguments) {
                        Ok(input) => input,
                        Err(e) => {
                            tracing::warn!(index, tool = %name, error = %e, "tool arguments are not valid JSON");
                            self.malformed.get_or_insert((index, e.to_string()));
                            Value::String(arguments)
                        }
                    }
                };
                Part::ToolRequest(ToolRequest {
                    reference: Some(id),
                    name,
                    input,
                })
            }
            Slot::Ignored => return,
        };

        self.parts.insert(index, part);
    }
}

/// Invoke the callback for a delta, then append it to its slot
fn merge_delta(
    index: u32,
    slot: &mut Slot,
    delta: AnthropicStreamDelta,
    callback: Option<&mut ChunkCallback<'_>>,
) -> Result<(), LlmError> {
    let chunk_delta = match (&*slot, &delta) {
        (Slot::Text(_), AnthropicStreamDelta::TextDelta { text }) => ChunkDelta::Text { text: text.clone() },
        (Slot::ToolCall { id, name, .. }, AnthropicStreamDelta::InputJsonDelta { partial_json }) => {
            ChunkDelta::ToolArguments {
                reference: id.clone(),
                name: name.clone(),
                partial_json: partial_json.clone(),
            }
        }
        (Slot::Ignored, _) | (_, AnthropicStreamDelta::Other) => return Ok(()),
        _ => {
            tracing::warn!(index, "delta kind does not match content block kind, skipping");
            return Ok(());
        }
    };

    emit(index, chunk_delta, callback)?;

    match (slot, delta) {
        (Slot::Text(buffer), AnthropicStreamDelta::TextDelta { text }) => buffer.push_str(&text),
        (Slot::ToolCall { arguments, .. }, AnthropicStreamDelta::InputJsonDelta { partial_json }) => {
            arguments.push_str(&partial_json);
        }
        _ => {}
    }

    Ok(())
}

fn emit(index: u32, delta: ChunkDelta, callback: Option<&mut ChunkCallback<'_>>) -> Result<(), LlmError> {
    let Some(callback) = callback else {
        return Ok(());
    };
    let chunk = ResponseChunk {
        index,
        role: Role::Model,
        delta,
    };
    callback(&chunk).map_err(LlmError::Callback)
}

/// Drive an event stream to a canonical response
///
/// Stops reading at `message_stop`, on the first error, or when `cancel`
/// fires. The stream is dropped on every exit path, which releases the
/// underlying connection.
pub async fn assemble_stream<S>(
    mut events: S,
    mut callback: Option<&mut ChunkCallback<'_>>,
    cancel: &CancellationToken,
) -> Result<GenerateResponse, LlmError>
where
    S: Stream<Item = Result<AnthropicStreamEvent, LlmError>> + Unpin,
{
    let mut assembler = StreamAssembler::new();

    while !assembler.is_finalized() {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("stream assembly cancelled");
                return Err(LlmError::Cancelled);
            }
            next = events.next() => next,
        };

        let Some(event) = next else {
            break;
        };

        assembler.push(event?, callback.as_deref_mut())?;
    }

    assembler.finish()
}
