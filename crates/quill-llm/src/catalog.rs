//! Model catalog: logical model names to Anthropic version identifiers

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Prefix under which models are registered with the host framework
pub const PROVIDER_PREFIX: &str = "anthropic";

/// Capabilities advertised for a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSupports {
    /// Accepts multi-turn conversations
    pub multiturn: bool,
    /// Supports tool calling
    pub tools: bool,
    /// Accepts a system prompt
    pub system_role: bool,
    /// Accepts image and document input
    pub media: bool,
}

impl ModelSupports {
    /// Capabilities shared by every current Claude model
    pub const MULTIMODAL: Self = Self {
        multiturn: true,
        tools: true,
        system_role: true,
        media: true,
    };
}

/// Catalog entry for a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Human-readable label
    pub label: String,
    /// Advertised capabilities
    #[serde(default)]
    pub supports: ModelSupports,
    /// Version identifiers; the first one is sent on the wire
    #[serde(default)]
    pub versions: Vec<String>,
}

impl ModelInfo {
    /// Build a multimodal entry with a single version
    pub fn multimodal(label: &str, version: &str) -> Self {
        Self {
            label: label.to_owned(),
            supports: ModelSupports::MULTIMODAL,
            versions: vec![version.to_owned()],
        }
    }
}

/// Models known without any configuration
pub fn builtin_models() -> IndexMap<&'static str, ModelInfo> {
    IndexMap::from([
        (
            "claude-3-5-sonnet-v2",
            ModelInfo::multimodal("Anthropic Claude 3.5 Sonnet v2", "claude-3-5-sonnet-latest"),
        ),
        (
            "claude-3-5-sonnet",
            ModelInfo::multimodal("Anthropic Claude 3.5 Sonnet", "claude-3-5-sonnet-20240620"),
        ),
        (
            "claude-3-haiku",
            ModelInfo::multimodal("Anthropic Claude 3 Haiku", "claude-3-haiku-20240307"),
        ),
        (
            "claude-3-5-haiku",
            ModelInfo::multimodal("Anthropic Claude 3.5 Haiku", "claude-3-5-haiku-latest"),
        ),
        (
            "claude-3-7-sonnet",
            ModelInfo::multimodal("Anthropic Claude 3.7 Sonnet", "claude-3-7-sonnet-latest"),
        ),
        (
            "claude-opus-4",
            ModelInfo::multimodal("Anthropic Claude Opus 4", "claude-opus-4-20250514"),
        ),
        (
            "claude-sonnet-4",
            ModelInfo::multimodal("Anthropic Claude Sonnet 4", "claude-sonnet-4-20250514"),
        ),
    ])
}

/// Strip an optional `anthropic/` prefix from a model name
pub fn logical_name(model: &str) -> &str {
    model
        .strip_prefix(PROVIDER_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(model)
}

/// Concurrent model catalog
///
/// Readable from any number of in-flight requests while new models are
/// defined.
#[derive(Debug, Default)]
pub struct Catalog {
    models: DashMap<String, ModelInfo>,
}

impl Catalog {
    /// Catalog with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with the built-in models
    pub fn builtin() -> Self {
        let catalog = Self::empty();
        for (name, info) in builtin_models() {
            catalog.define(name, info);
        }
        catalog
    }

    /// Add or replace an entry
    pub fn define(&self, name: &str, info: ModelInfo) {
        self.models.insert(logical_name(name).to_owned(), info);
    }

    /// Look up an entry by logical name
    pub fn get(&self, name: &str) -> Option<ModelInfo> {
        self.models.get(logical_name(name)).map(|entry| entry.value().clone())
    }

    /// Whether a logical name has an entry
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(logical_name(name))
    }

    /// All logical names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Resolve a logical name to the version identifier sent on the wire
    ///
    /// Entries declared without versions resolve to their own name.
    pub fn resolve_version(&self, model: &str) -> Result<String, LlmError> {
        let name = logical_name(model);
        let entry = self.models.get(name).ok_or_else(|| LlmError::UnknownModel {
            model: model.to_owned(),
        })?;

        Ok(entry
            .versions
            .first()
            .cloned()
            .unwrap_or_else(|| name.to_owned()))
    }
}
