//! Canonical types for generation requests and responses
//!
//! These types are provider-agnostic: the orchestration layer builds and
//! consumes them, and the translator and assembler convert them to and from
//! the Anthropic wire format.

pub mod message;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;

pub use message::{Message, Part, Role, ToolRequest, ToolResponse};
pub use request::{GenerateRequest, GenerationConfig};
pub use response::{FinishReason, GenerateResponse, Usage};
pub use stream::{ChunkDelta, ResponseChunk};
pub use tool::{ToolChoice, ToolDefinition};
