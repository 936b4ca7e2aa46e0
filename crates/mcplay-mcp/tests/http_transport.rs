//! HTTP connector against in-process MCP servers (streamable HTTP and legacy SSE).

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures_util::stream::{self, Stream, StreamExt};
use mcplay_core::{ServerConfig, ToolServerConnector, ToolServerError};
use mcplay_mcp::HttpMcpConnector;
use serde_json::{Map, Value, json};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

const SESSION_ID: &str = "session-42";

/// Answer a JSON-RPC request the way a small MCP server would.
///
/// Returns `None` for notifications.
fn respond(request: &Value) -> Option<Value> {
    let id = request.get("id")?.clone();
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    let outcome = match method {
        "initialize" => Ok(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "fake", "version": "0.1.0" }
        })),
        "tools/list" => Ok(json!({
            "tools": [
                {
                    "name": "echo",
                    "description": "Echo the input",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "text": { "type": "string" } },
                        "required": ["text"]
                    }
                },
                { "name": "deny" }
            ]
        })),
        "tools/call" => match params["name"].as_str() {
            Some("echo") => Ok(json!({
                "content": [{ "type": "text", "text": params["arguments"]["text"] }]
            })),
            Some("deny") => Err(json!({ "code": -32000, "message": "Permission Denied" })),
            _ => Err(json!({ "code": -32602, "message": "Unknown tool" })),
        },
        _ => Err(json!({ "code": -32601, "message": "Method not found" })),
    };

    Some(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    })
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn text_of(arguments: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("text".to_string(), json!(arguments));
    map
}

// ---------------------------------------------------------------------------
// Streamable HTTP
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct StreamableState {
    /// Session header seen on each request after initialize.
    seen_sessions: Arc<Mutex<Vec<Option<String>>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

async fn streamable_post(
    State(state): State<StreamableState>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let session = headers
        .get("mcp-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let is_initialize = request["method"] == "initialize";
    if !is_initialize {
        state.seen_sessions.lock().unwrap().push(session);
    }

    let Some(response) = respond(&request) else {
        return StatusCode::ACCEPTED.into_response();
    };

    if is_initialize {
        return ([("mcp-session-id", SESSION_ID)], Json(response)).into_response();
    }
    if request["method"] == "tools/call" {
        // Answer tool calls as a one-event stream.
        let body = format!("event: message\ndata: {response}\n\n");
        return ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response();
    }
    Json(response).into_response()
}

async fn streamable_delete(State(state): State<StreamableState>, headers: HeaderMap) -> StatusCode {
    if let Some(session) = headers.get("mcp-session-id").and_then(|v| v.to_str().ok()) {
        state.deleted.lock().unwrap().push(session.to_string());
    }
    StatusCode::OK
}

#[tokio::test]
async fn test_streamable_http_session() {
    let state = StreamableState::default();
    let router = Router::new()
        .route("/mcp", post(streamable_post).delete(streamable_delete))
        .with_state(state.clone());
    let base = serve(router).await;

    let connector = HttpMcpConnector::new(Duration::from_secs(5)).unwrap();
    let session = connector
        .connect(&ServerConfig::new("local", format!("{base}/mcp")))
        .await
        .unwrap();

    let tools = session.list_tools().await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["echo", "deny"]);
    assert!(tools.iter().all(|t| t.server == "local"));

    let result = session.call_tool("echo", text_of("hello")).await.unwrap();
    assert!(!result.is_error);
    assert_eq!(result.text(), "hello");

    let err = session.call_tool("deny", Map::new()).await.unwrap_err();
    assert_eq!(
        err,
        ToolServerError::Server {
            code: -32000,
            message: "Permission Denied".to_string(),
        }
    );

    session.close().await.unwrap();
    session.close().await.unwrap();

    let seen = state.seen_sessions.lock().unwrap().clone();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|s| s.as_deref() == Some(SESSION_ID)));
    assert_eq!(*state.deleted.lock().unwrap(), vec![SESSION_ID.to_string()]);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connector = HttpMcpConnector::new(Duration::from_secs(5)).unwrap();
    let err = connector
        .connect(&ServerConfig::new("gone", format!("http://{addr}/mcp")))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ToolServerError::Transport(_)));
}

// ---------------------------------------------------------------------------
// Legacy SSE
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct SseState {
    outbound: broadcast::Sender<String>,
}

async fn sse_stream(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.outbound.subscribe();
    let endpoint = stream::once(async {
        Ok::<_, Infallible>(Event::default().event("endpoint").data("/messages?session_id=1"))
    });
    let messages = BroadcastStream::new(receiver).filter_map(|message| async move {
        message
            .ok()
            .map(|data| Ok::<_, Infallible>(Event::default().event("message").data(data)))
    });
    Sse::new(endpoint.chain(messages))
}

async fn sse_post(State(state): State<SseState>, Json(request): Json<Value>) -> StatusCode {
    if let Some(response) = respond(&request) {
        let _ = state.outbound.send(response.to_string());
    }
    StatusCode::ACCEPTED
}

#[tokio::test]
async fn test_legacy_sse_session() {
    let (outbound, _keep) = broadcast::channel(16);
    let router = Router::new()
        .route("/sse", get(sse_stream))
        .route("/messages", post(sse_post))
        .with_state(SseState { outbound });
    let base = serve(router).await;

    let connector = HttpMcpConnector::new(Duration::from_secs(5)).unwrap();
    let session = connector
        .connect(&ServerConfig::new("legacy", format!("{base}/sse")))
        .await
        .unwrap();

    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "echo");

    let result = session.call_tool("echo", text_of("over sse")).await.unwrap();
    assert_eq!(result.text(), "over sse");

    let err = session.call_tool("deny", Map::new()).await.unwrap_err();
    assert!(matches!(err, ToolServerError::Server { ref message, .. } if message == "Permission Denied"));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_sse_endpoint_must_be_event_stream() {
    let router = Router::new().route("/sse", get(|| async { "plain text" }));
    let base = serve(router).await;

    let connector = HttpMcpConnector::new(Duration::from_secs(5)).unwrap();
    let err = connector
        .connect(&ServerConfig::new("legacy", format!("{base}/sse")))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ToolServerError::Protocol(_)));
}
