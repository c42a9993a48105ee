use serde::{Deserialize, Serialize};

use super::message::Role;

/// One streamed fragment, handed to the chunk callback before it is merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseChunk {
    /// Index of the output part this fragment extends
    pub index: u32,
    /// Always `model`
    pub role: Role,
    /// The fragment itself
    pub delta: ChunkDelta,
}

/// Content carried by a single stream delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkDelta {
    /// Text fragment
    Text {
        /// Fragment to append
        text: String,
    },
    /// Fragment of a tool call's JSON-encoded arguments
    ToolArguments {
        /// Call identifier
        reference: String,
        /// Tool name
        name: String,
        /// Raw JSON fragment, not parseable on its own
        partial_json: String,
    },
}

impl ResponseChunk {
    /// Text carried by this chunk, empty for tool argument fragments
    pub fn text(&self) -> &str {
        match &self.delta {
            ChunkDelta::Text { text } => text,
            ChunkDelta::ToolArguments { .. } => "",
        }
    }
}
