//! Plugin lifecycle: initialization, model registration, and generation

use std::sync::{Arc, OnceLock};

use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::assemble::{ChunkCallback, assemble_response, assemble_stream};
use crate::catalog::{Catalog, ModelInfo, PROVIDER_PREFIX};
use crate::error::LlmError;
use crate::transport::{HttpTransport, Transport};
use crate::translate::{DEFAULT_MAX_TOKENS, RequestTranslator};
use crate::types::{GenerateRequest, GenerateResponse};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Plugin options
#[derive(Debug, Clone, Default)]
pub struct AnthropicOptions {
    /// API key; falls back to `ANTHROPIC_API_KEY`
    pub api_key: Option<SecretString>,
    /// API base URL; defaults to the public endpoint
    pub base_url: Option<Url>,
    /// `max_tokens` sent when a request leaves it unset
    pub default_max_tokens: Option<u32>,
}

/// Shared state established by `init`
struct PluginState {
    transport: Arc<dyn Transport>,
    catalog: Arc<Catalog>,
}

/// Anthropic provider plugin
///
/// Must be initialized exactly once before models can be looked up or used.
pub struct AnthropicPlugin {
    options: AnthropicOptions,
    state: OnceLock<PluginState>,
}

impl std::fmt::Debug for AnthropicPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicPlugin")
            .field("initialized", &self.state.get().is_some())
            .finish_non_exhaustive()
    }
}

impl AnthropicPlugin {
    /// Create an uninitialized plugin
    pub const fn new(options: AnthropicOptions) -> Self {
        Self {
            options,
            state: OnceLock::new(),
        }
    }

    /// Provider name models are registered under
    pub const fn name(&self) -> &'static str {
        PROVIDER_PREFIX
    }

    /// Resolve credentials, build the HTTP transport, and register built-in models
    pub fn init(&self) -> Result<(), LlmError> {
        if self.state.get().is_some() {
            return Err(LlmError::AlreadyInitialized);
        }

        let api_key = self.resolve_api_key()?;
        let transport = HttpTransport::new(api_key, self.options.base_url.clone())?;
        self.install(Arc::new(transport))
    }

    /// Initialize with a caller-supplied transport
    pub fn init_with_transport(&self, transport: Arc<dyn Transport>) -> Result<(), LlmError> {
        if self.state.get().is_some() {
            return Err(LlmError::AlreadyInitialized);
        }
        self.install(transport)
    }

    fn install(&self, transport: Arc<dyn Transport>) -> Result<(), LlmError> {
        let state = PluginState {
            transport,
            catalog: Arc::new(Catalog::builtin()),
        };
        let models = state.catalog.names().len();

        self.state.set(state).map_err(|_| LlmError::AlreadyInitialized)?;
        tracing::info!(plugin = PROVIDER_PREFIX, models, "plugin initialized");
        Ok(())
    }

    fn resolve_api_key(&self) -> Result<SecretString, LlmError> {
        if let Some(key) = &self.options.api_key
            && !key.expose_secret().is_empty()
        {
            return Ok(key.clone());
        }

        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(SecretString::from(key)),
            _ => Err(LlmError::Configuration(format!(
                "Anthropic API key is required; pass it in the plugin options or set {API_KEY_ENV}"
            ))),
        }
    }

    fn state(&self) -> Result<&PluginState, LlmError> {
        self.state.get().ok_or(LlmError::NotInitialized)
    }

    /// Register a model, or look up a known one when `info` is `None`
    pub fn define_model(&self, name: &str, info: Option<ModelInfo>) -> Result<AnthropicModel, LlmError> {
        let state = self.state()?;

        match info {
            Some(info) => {
                tracing::debug!(model = name, versions = ?info.versions, "defining model");
                state.catalog.define(name, info);
            }
            None if state.catalog.contains(name) => {}
            None => {
                return Err(LlmError::UnknownModel { model: name.to_owned() });
            }
        }

        Ok(self.handle(state, name))
    }

    /// Look up a registered model; accepts `anthropic/<name>`
    pub fn model(&self, name: &str) -> Option<AnthropicModel> {
        let state = self.state.get()?;
        state.catalog.contains(name).then(|| self.handle(state, name))
    }

    /// Logical names of every registered model
    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(self.state()?.catalog.names())
    }

    fn handle(&self, state: &PluginState, name: &str) -> AnthropicModel {
        AnthropicModel {
            name: crate::catalog::logical_name(name).to_owned(),
            catalog: Arc::clone(&state.catalog),
            transport: Arc::clone(&state.transport),
            default_max_tokens: self.options.default_max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

/// Handle to a registered model
#[derive(Clone)]
pub struct AnthropicModel {
    name: String,
    catalog: Arc<Catalog>,
    transport: Arc<dyn Transport>,
    default_max_tokens: u32,
}

impl std::fmt::Debug for AnthropicModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicModel")
            .field("name", &self.name)
            .field("default_max_tokens", &self.default_max_tokens)
            .finish_non_exhaustive()
    }
}

impl AnthropicModel {
    /// Logical model name, without the provider prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name, e.g. `anthropic/claude-sonnet-4`
    pub fn qualified_name(&self) -> String {
        format!("{PROVIDER_PREFIX}/{}", self.name)
    }

    /// Current catalog entry
    pub fn info(&self) -> Option<ModelInfo> {
        self.catalog.get(&self.name)
    }

    /// Run one generation
    ///
    /// With a callback the response is streamed and each delta is handed to
    /// the callback as it arrives; without one a single request/response
    /// exchange is made. Translation failures happen before any network
    /// activity.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        callback: Option<&mut ChunkCallback<'_>>,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, LlmError> {
        let wire_request = RequestTranslator::new(&self.catalog)
            .with_default_max_tokens(self.default_max_tokens)
            .translate(request, &self.name)?;

        match callback {
            None => {
                let response = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(LlmError::Cancelled),
                    response = self.transport.send(&wire_request) => response?,
                };
                Ok(assemble_response(response))
            }
            Some(callback) => {
                let events = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(LlmError::Cancelled),
                    events = self.transport.send_streaming(&wire_request) => events?,
                };
                assemble_stream(events, Some(callback), cancel).await
            }
        }
    }
}
