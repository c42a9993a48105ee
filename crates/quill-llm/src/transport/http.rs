//! reqwest-backed transport with SSE decoding

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{EventStream, Transport};
use crate::error::LlmError;
use crate::protocol::{AnthropicErrorResponse, AnthropicRequest, AnthropicResponse, AnthropicStreamEvent};

/// Default Anthropic API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP transport for the Anthropic Messages API
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport; `base_url` defaults to the public API
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the default base URL cannot be parsed.
    pub fn new(api_key: SecretString, base_url: Option<Url>) -> Result<Self, LlmError> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| LlmError::Configuration(format!("invalid default base URL: {e}")))?,
        };

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    /// Build the messages endpoint URL
    fn messages_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/messages")
    }

    async fn post(&self, request: &AnthropicRequest) -> Result<Response, LlmError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(model = %request.model, error = %e, "upstream request failed");
                LlmError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(model = %request.model, %status, "upstream returned error");
        Err(LlmError::Transport(describe_error(status.as_u16(), &body)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, LlmError> {
        let response = self.post(request).await?;

        response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to parse response: {e}")))
    }

    async fn send_streaming(&self, request: &AnthropicRequest) -> Result<EventStream, LlmError> {
        let mut request = request.clone();
        request.stream = Some(true);

        let response = self.post(&request).await?;

        let events = response.bytes_stream().eventsource().filter_map(|result| {
            let item = match result {
                Ok(event) => parse_event(&event.data).map(Ok),
                Err(e) => Some(Err(LlmError::Transport(e.to_string()))),
            };
            async move { item }
        });

        Ok(Box::pin(events))
    }
}

/// Decode one SSE `data:` payload; blank or unparseable frames yield `None`
fn parse_event(data: &str) -> Option<AnthropicStreamEvent> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, "skipping unparseable Anthropic SSE event");
            None
        }
    }
}

/// Human-readable message for a non-success response body
fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<AnthropicErrorResponse>(body) {
        Ok(error) => format!("provider returned {status} ({}): {}", error.error.error_type, error.error.message),
        Err(_) => format!("provider returned {status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_appends_path() {
        let transport = HttpTransport::new(
            SecretString::from("key"),
            Some(Url::parse("http://localhost:8080/v1/").unwrap()),
        )
        .unwrap();
        assert_eq!(transport.messages_url(), "http://localhost:8080/v1/messages");

        let transport = HttpTransport::new(SecretString::from("key"), None).unwrap();
        assert_eq!(transport.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let transport = HttpTransport::new(SecretString::from("sk-ant-secret"), None).unwrap();
        assert!(!format!("{transport:?}").contains("sk-ant-secret"));
    }

    #[test]
    fn blank_and_garbage_frames_are_skipped() {
        assert!(parse_event("").is_none());
        assert!(parse_event("   \n").is_none());
        assert!(parse_event("{not json").is_none());
    }

    #[test]
    fn stream_frames_decode() {
        let event = parse_event(r#"{"type":"content_block_stop","index":2}"#).unwrap();
        assert!(matches!(event, AnthropicStreamEvent::ContentBlockStop { index: 2 }));

        let event = parse_event(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(event, AnthropicStreamEvent::Ping));
    }

    #[test]
    fn error_bodies_are_described() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            describe_error(401, body),
            "provider returned 401 (authentication_error): invalid x-api-key"
        );
        assert_eq!(describe_error(502, "Bad Gateway"), "provider returned 502: Bad Gateway");
    }
}
