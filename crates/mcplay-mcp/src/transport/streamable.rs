//! Streamable HTTP transport.

use async_trait::async_trait;
use futures_util::StreamExt;
use mcplay_core::ToolServerError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::RwLock;

use super::{
    ACCEPT_JSON_AND_SSE, SESSION_HEADER, Transport, check_status, content_type, transport_error,
};
use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, decode_response};
use crate::sse::{SseEventParser, is_event_stream_content_type};

/// Streamable HTTP transport: every message is a POST to the server URL.
pub struct StreamableHttpTransport {
    client: reqwest::Client,
    url: String,
    session_id: RwLock<Option<String>>,
}

impl StreamableHttpTransport {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            session_id: RwLock::new(None),
        }
    }

    /// Session id assigned by the server, if any.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    async fn post(&self, body: String) -> Result<reqwest::Response, ToolServerError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_JSON_AND_SSE)
            .body(body);
        if let Some(session_id) = self.session_id.read().await.as_deref() {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request.send().await.map_err(|e| transport_error(&e))?;
        check_status(&response)?;

        if let Some(session_id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            *self.session_id.write().await = Some(session_id.to_string());
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for StreamableHttpTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, ToolServerError> {
        let body = serde_json::to_string(&request)
            .map_err(|e| ToolServerError::Protocol(e.to_string()))?;
        tracing::debug!(url = %self.url, method = %request.method, id = request.id, "Sending MCP HTTP request");

        let response = self.post(body).await?;
        if is_event_stream_content_type(&content_type(&response)) {
            return read_event_stream_response(response, request.id).await;
        }

        let body = response.bytes().await.map_err(|e| transport_error(&e))?;
        let text = String::from_utf8_lossy(&body);
        decode_response(&text)?.ok_or_else(|| {
            ToolServerError::Protocol("Expected a response, got a server request".to_string())
        })
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), ToolServerError> {
        let body = serde_json::to_string(&notification)
            .map_err(|e| ToolServerError::Protocol(e.to_string()))?;
        self.post(body).await.map(|_| ())
    }

    async fn close(&self) {
        let Some(session_id) = self.session_id.write().await.take() else {
            return;
        };
        let result = self
            .client
            .delete(&self.url)
            .header(SESSION_HEADER, &session_id)
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!(url = %self.url, error = %e, "Failed to end MCP HTTP session");
        }
    }
}

/// Read events until the response for `id` arrives.
async fn read_event_stream_response(
    response: reqwest::Response,
    id: u64,
) -> Result<JsonRpcResponse, ToolServerError> {
    let mut stream = response.bytes_stream();
    let mut parser = SseEventParser::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transport_error(&e))?;
        for event in parser.push(&chunk) {
            if let Some(response) = matching_response(&event.data, id)? {
                return Ok(response);
            }
        }
    }

    for event in parser.finish() {
        if let Some(response) = matching_response(&event.data, id)? {
            return Ok(response);
        }
    }

    Err(ToolServerError::Protocol(
        "Event stream ended without a response".to_string(),
    ))
}

fn matching_response(data: &str, id: u64) -> Result<Option<JsonRpcResponse>, ToolServerError> {
    if data.trim().is_empty() {
        return Ok(None);
    }
    Ok(decode_response(data)?.filter(|response| response.id_u64().is_none_or(|other| other == id)))
}
