use serde::Deserialize;

/// A model registered in addition to the built-in catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomModelConfig {
    /// Human-readable label
    pub label: String,
    /// Version identifiers; the first is sent on the wire, the model name is used when empty
    #[serde(default)]
    pub versions: Vec<String>,
    /// Accepts multi-turn conversations
    #[serde(default = "enabled")]
    pub multiturn: bool,
    /// Supports tool calling
    #[serde(default = "enabled")]
    pub tools: bool,
    /// Accepts a system prompt
    #[serde(default = "enabled")]
    pub system_role: bool,
    /// Accepts image and document input
    #[serde(default = "enabled")]
    pub media: bool,
}

const fn enabled() -> bool {
    true
}
