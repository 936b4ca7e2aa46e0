//! Legacy HTTP+SSE transport.
//!
//! The client holds a GET event stream open. The server's first event
//! (`endpoint`) names the URL requests are POSTed to; responses come back on
//! the stream and are matched to their request by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use mcplay_core::ToolServerError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{Transport, check_status, content_type, transport_error};
use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, decode_response};
use crate::sse::{SseEvent, SseEventParser, is_event_stream_content_type};

/// Event name announcing the POST endpoint.
const ENDPOINT_EVENT: &str = "endpoint";

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;

/// Legacy SSE transport.
pub struct SseTransport {
    client: reqwest::Client,
    endpoint: String,
    pending: PendingMap,
    reader: JoinHandle<()>,
}

impl SseTransport {
    /// Open the event stream and wait for the endpoint announcement.
    pub async fn connect(
        client: reqwest::Client,
        url: &str,
        endpoint_timeout: Duration,
    ) -> Result<Self, ToolServerError> {
        let response = client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        check_status(&response)?;

        let content_type = content_type(&response);
        if !is_event_stream_content_type(&content_type) {
            return Err(ToolServerError::Protocol(format!(
                "Expected an event stream, got '{content_type}'"
            )));
        }

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (endpoint_tx, endpoint_rx) = oneshot::channel();
        let reader = tokio::spawn(read_events(
            response,
            url.to_string(),
            endpoint_tx,
            Arc::clone(&pending),
        ));

        let announced = match tokio::time::timeout(endpoint_timeout, endpoint_rx).await {
            Ok(Ok(endpoint)) => endpoint,
            Ok(Err(_)) => {
                reader.abort();
                return Err(ToolServerError::Transport(
                    "Event stream closed before announcing an endpoint".to_string(),
                ));
            }
            Err(_) => {
                reader.abort();
                return Err(ToolServerError::Timeout(endpoint_timeout.as_secs()));
            }
        };

        let endpoint = match resolve_endpoint(url, &announced) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                reader.abort();
                return Err(e);
            }
        };
        tracing::debug!(url = %url, endpoint = %endpoint, "MCP SSE endpoint announced");

        Ok(Self {
            client,
            endpoint,
            pending,
            reader,
        })
    }

    /// URL requests are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, body: String) -> Result<(), ToolServerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        check_status(&response)
    }
}

/// Removes a pending entry when the waiting request goes away.
struct PendingGuard {
    pending: PendingMap,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&self.id);
        }
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, ToolServerError> {
        let id = request.id;
        let body = serde_json::to_string(&request)
            .map_err(|e| ToolServerError::Protocol(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| ToolServerError::Protocol("Pending request map poisoned".to_string()))?;
            pending.insert(id, tx);
        }
        let _guard = PendingGuard {
            pending: Arc::clone(&self.pending),
            id,
        };

        tracing::debug!(endpoint = %self.endpoint, method = %request.method, id, "Sending MCP SSE request");
        self.post(body).await?;

        rx.await.map_err(|_| {
            ToolServerError::Transport("Event stream closed before the response arrived".to_string())
        })
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), ToolServerError> {
        let body = serde_json::to_string(&notification)
            .map_err(|e| ToolServerError::Protocol(e.to_string()))?;
        self.post(body).await
    }

    async fn close(&self) {
        self.reader.abort();
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_events(
    response: reqwest::Response,
    url: String,
    endpoint_tx: oneshot::Sender<String>,
    pending: PendingMap,
) {
    let mut endpoint_tx = Some(endpoint_tx);
    let mut stream = response.bytes_stream();
    let mut parser = SseEventParser::default();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "MCP event stream failed");
                break;
            }
        };
        for event in parser.push(&chunk) {
            handle_event(event, &mut endpoint_tx, &pending);
        }
    }
    for event in parser.finish() {
        handle_event(event, &mut endpoint_tx, &pending);
    }

    tracing::debug!(url = %url, "MCP event stream ended");
    // Dropping the senders fails every request still waiting.
    if let Ok(mut pending) = pending.lock() {
        pending.clear();
    }
}

fn handle_event(
    event: SseEvent,
    endpoint_tx: &mut Option<oneshot::Sender<String>>,
    pending: &PendingMap,
) {
    if event.event == ENDPOINT_EVENT {
        if let Some(tx) = endpoint_tx.take() {
            let _ = tx.send(event.data.trim().to_string());
        }
        return;
    }

    let response = match decode_response(&event.data) {
        Ok(Some(response)) => response,
        Ok(None) => return,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping undecodable MCP event");
            return;
        }
    };
    let Some(id) = response.id_u64() else {
        tracing::debug!("Skipping MCP response without id");
        return;
    };

    let waiter = pending.lock().ok().and_then(|mut pending| pending.remove(&id));
    match waiter {
        Some(tx) => {
            let _ = tx.send(response);
        }
        None => tracing::debug!(id, "No pending request for MCP response"),
    }
}

/// Resolve the announced endpoint against the stream URL.
fn resolve_endpoint(base: &str, endpoint: &str) -> Result<String, ToolServerError> {
    let base = reqwest::Url::parse(base)
        .map_err(|e| ToolServerError::Protocol(format!("Invalid server url '{base}': {e}")))?;
    base.join(endpoint)
        .map(String::from)
        .map_err(|e| ToolServerError::Protocol(format!("Invalid endpoint '{endpoint}': {e}")))
}
