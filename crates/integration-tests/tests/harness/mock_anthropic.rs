//! Mock Anthropic Messages API for integration tests
//!
//! Serves `POST /v1/messages` as either a JSON document or an SSE stream,
//! depending on the request's `stream` flag, and records every request.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Canned behaviour of the mock
#[derive(Debug, Clone)]
pub enum Scenario {
    /// Answer with text, streamed as one delta per fragment
    Text(Vec<&'static str>),
    /// Answer with a short text block followed by a `get_weather` tool call
    ToolCall,
    /// Stream a tool call whose argument fragments do not form valid JSON
    MalformedToolCall,
    /// Stream that ends without `message_stop`
    Truncated,
    /// Stream that fails with a provider `error` event
    ErrorEvent,
    /// Reject every request with this status and Anthropic error document
    Reject {
        status: u16,
        error_type: &'static str,
        message: &'static str,
    },
}

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Value of the `x-api-key` header
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header
    pub version: Option<String>,
    /// JSON body
    pub body: Value,
}

/// Mock Anthropic backend bound to an ephemeral port
pub struct MockAnthropic {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    scenario: Scenario,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockAnthropic {
    /// Start the mock server, returning once it is listening
    pub async fn start(scenario: Scenario) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            scenario,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/messages", routing::post(handle_messages))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including `/v1`, since the transport appends `/messages`
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/v1", self.addr)).expect("valid mock URL")
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("lock not poisoned").clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("lock not poisoned").len()
    }
}

impl Drop for MockAnthropic {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Handler --

async fn handle_messages(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);

    let model = body["model"].as_str().unwrap_or("unknown").to_owned();
    let streaming = body["stream"].as_bool().unwrap_or(false);

    state.requests.lock().expect("lock not poisoned").push(RecordedRequest {
        api_key: header_value("x-api-key"),
        version: header_value("anthropic-version"),
        body,
    });

    if let Scenario::Reject {
        status,
        error_type,
        message,
    } = &state.scenario
    {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error = json!({
            "type": "error",
            "error": {"type": error_type, "message": message}
        });
        return (status, Json(error)).into_response();
    }

    if streaming {
        let events = stream_events(&state.scenario, &model);
        let body: String = events
            .iter()
            .map(|event| format!("event: {}\ndata: {event}\n\n", event["type"].as_str().unwrap_or("unknown")))
            .collect();
        return ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response();
    }

    Json(message_document(&state.scenario, &model)).into_response()
}

// -- Canned bodies --

fn message_document(scenario: &Scenario, model: &str) -> Value {
    match scenario {
        Scenario::ToolCall => json!({
            "id": "msg_mock_tool",
            "type": "message",
            "role": "assistant",
            "model": model,
            "content": [
                {"type": "text", "text": "Let me check the weather."},
                {"type": "tool_use", "id": "toolu_mock_1", "name": "get_weather", "input": {"location": "San Francisco"}}
            ],
            "stop_reason": "tool_use",
            "stop_sequence": null,
            "usage": {"input_tokens": 42, "output_tokens": 17}
        }),
        Scenario::Text(fragments) => json!({
            "id": "msg_mock_text",
            "type": "message",
            "role": "assistant",
            "model": model,
            "content": [{"type": "text", "text": fragments.concat()}],
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }),
        _ => json!({
            "id": "msg_mock_other",
            "type": "message",
            "role": "assistant",
            "model": model,
            "content": [],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 0}
        }),
    }
}

fn stream_events(scenario: &Scenario, model: &str) -> Vec<Value> {
    let start = json!({
        "type": "message_start",
        "message": {
            "id": "msg_mock_stream",
            "type": "message",
            "role": "assistant",
            "model": model,
            "content": [],
            "stop_reason": null,
            "usage": {"input_tokens": 25, "output_tokens": 1}
        }
    });

    let mut events = vec![start, json!({"type": "ping"})];

    match scenario {
        Scenario::Text(fragments) => {
            events.push(text_block_start(0));
            events.extend(fragments.iter().map(|fragment| text_delta(0, fragment)));
            events.push(block_stop(0));
            events.push(message_delta("end_turn", 12));
            events.push(json!({"type": "message_stop"}));
        }
        Scenario::ToolCall => {
            events.push(text_block_start(0));
            events.push(text_delta(0, "Let me check the weather."));
            events.push(block_stop(0));
            events.push(tool_block_start(1, "toolu_mock_stream", "get_weather"));
            for fragment in ["", r#"{"location""#, r#": "San Fra"#, r#"ncisco"}"#] {
                events.push(json_delta(1, fragment));
            }
            events.push(block_stop(1));
            events.push(message_delta("tool_use", 30));
            events.push(json!({"type": "message_stop"}));
        }
        Scenario::MalformedToolCall => {
            events.push(tool_block_start(0, "toolu_mock_bad", "get_weather"));
            events.push(json_delta(0, r#"{"location": "Par"#));
            events.push(block_stop(0));
            events.push(message_delta("tool_use", 8));
            events.push(json!({"type": "message_stop"}));
        }
        Scenario::Truncated => {
            events.push(text_block_start(0));
            events.push(text_delta(0, "This answer is cut"));
        }
        Scenario::ErrorEvent => {
            events.push(text_block_start(0));
            events.push(text_delta(0, "Partial"));
            events.push(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            }));
        }
        Scenario::Reject { .. } => {}
    }

    events
}

fn text_block_start(index: u32) -> Value {
    json!({"type": "content_block_start", "index": index, "content_block": {"type": "text", "text": ""}})
}

fn tool_block_start(index: u32, id: &str, name: &str) -> Value {
    json!({
        "type": "content_block_start",
        "index": index,
        "content_block": {"type": "tool_use", "id": id, "name": name, "input": {}}
    })
}

fn text_delta(index: u32, text: &str) -> Value {
    json!({"type": "content_block_delta", "index": index, "delta": {"type": "text_delta", "text": text}})
}

fn json_delta(index: u32, partial_json: &str) -> Value {
    json!({
        "type": "content_block_delta",
        "index": index,
        "delta": {"type": "input_json_delta", "partial_json": partial_json}
    })
}

fn block_stop(index: u32) -> Value {
    json!({"type": "content_block_stop", "index": index})
}

fn message_delta(stop_reason: &str, output_tokens: u32) -> Value {
    json!({
        "type": "message_delta",
        "delta": {"stop_reason": stop_reason, "stop_sequence": null},
        "usage": {"output_tokens": output_tokens}
    })
}
