//! Anthropic adapter for Quill
//!
//! Translates provider-agnostic generation requests into the Anthropic
//! Messages API wire format and assembles synchronous or streamed
//! responses back into the canonical response shape.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod assemble;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod plugin;
pub mod protocol;
pub mod transport;
pub mod translate;
pub mod types;

pub use assemble::{AssemblyState, ChunkCallback, StreamAssembler, assemble_response, assemble_stream};
pub use catalog::{Catalog, ModelInfo, ModelSupports};
pub use error::LlmError;
pub use plugin::{AnthropicModel, AnthropicOptions, AnthropicPlugin};
pub use transport::{EventStream, HttpTransport, Transport};
pub use translate::RequestTranslator;
pub use types::{GenerateRequest, GenerateResponse, Message, Part, ResponseChunk, Role};
