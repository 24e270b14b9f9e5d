//! HTTP transport MCP client
//!
//! Sends JSON-RPC 2.0 requests as HTTP POSTs. Servers may answer with a
//! plain JSON body or with a short Server-Sent Events stream that carries
//! the response; both are accepted.

use crate::client::{MCPClient, MCPServerInfo, MCPToolDefinition, MCPToolResult};
use crate::{MCPError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Protocol revision requested during the handshake
pub const PROTOCOL_VERSION: &str = "2025-03-26";

const SESSION_HEADER: &str = "mcp-session-id";

/// MCP client speaking JSON-RPC over HTTP
pub struct HttpMCPClient {
    url: String,
    headers: HeaderMap,
    http_client: reqwest::Client,

    /// Session assigned by the server during the handshake
    session_id: Mutex<Option<String>>,
    server_info: Mutex<Option<MCPServerInfo>>,
    connected: AtomicBool,
    request_id: AtomicU64,
}

impl HttpMCPClient {
    /// Create a client for the server at `url`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_headers(url, &HashMap::new(), timeout)
    }

    /// Create a client that sends extra headers, e.g. `Authorization`
    pub fn with_headers(
        url: impl Into<String>,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MCPError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            headers: build_headers(headers)?,
            http_client,
            session_id: Mutex::new(None),
            server_info: Mutex::new(None),
            connected: AtomicBool::new(false),
            request_id: AtomicU64::new(0),
        })
    }

    /// Server URL
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, body: &Value) -> Result<reqwest::Response> {
        let mut request = self
            .http_client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(body);
        if let Some(session) = self.session_id.lock().await.as_deref() {
            request = request.header(SESSION_HEADER, session);
        }

        request
            .send()
            .await
            .map_err(|e| MCPError::ConnectionFailed(format!("HTTP request to {} failed: {e}", self.url)))
    }

    /// Send a request and return its `result`
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed) + 1;
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });

        debug!(url = %self.url, method, id, "Sending MCP request");
        let response = self.post(&body).await?;

        let status = response.status();
        let session = header_str(response.headers(), SESSION_HEADER);
        let content_type = header_str(response.headers(), CONTENT_TYPE.as_str());
        if let Some(session) = session {
            *self.session_id.lock().await = Some(session);
        }

        let text = response
            .text()
            .await
            .map_err(|e| MCPError::RequestFailed(format!("Failed to read response to {method}: {e}")))?;
        if !status.is_success() {
            return Err(MCPError::RequestFailed(format!(
                "HTTP {status} for {method}: {text}"
            )));
        }

        let message = decode_response(content_type.as_deref(), &text, id)?;
        if let Some(error) = message.get("error") {
            return Err(MCPError::ServerError {
                method: method.to_string(),
                error: error.clone(),
            });
        }

        message
            .get("result")
            .cloned()
            .ok_or_else(|| MCPError::RequestFailed(format!("No result in response to {method}")))
    }

    /// Send a notification; failures are only logged
    async fn notify(&self, method: &str) {
        let body = json!({ "jsonrpc": "2.0", "method": method });
        if let Err(e) = self.post(&body).await {
            warn!(method, error = %e, "MCP notification failed");
        }
    }

    async fn initialize(&self) -> Result<MCPServerInfo> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let result = self.send_request("initialize", params).await?;
        let server_info = parse_server_info(&result);
        info!(
            server = %server_info.name,
            version = %server_info.version,
            protocol = %server_info.protocol_version,
            "Connected to MCP server"
        );

        self.notify("notifications/initialized").await;
        Ok(server_info)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(MCPError::NotConnected)
        }
    }
}

#[derive(Deserialize)]
struct ToolsPage {
    #[serde(default)]
    tools: Vec<MCPToolDefinition>,
    #[serde(default, rename = "nextCursor")]
    next_cursor: Option<String>,
}

#[async_trait]
impl MCPClient for HttpMCPClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn connect(&self) -> Result<()> {
        let server_info = self.initialize().await?;
        *self.server_info.lock().await = Some(server_info);
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn list_tools(&self) -> Result<Vec<MCPToolDefinition>> {
        self.ensure_connected()?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let result = self.send_request("tools/list", params).await?;
            let page: ToolsPage = serde_json::from_value(result)
                .map_err(|e| MCPError::RequestFailed(format!("Failed to parse tools: {e}")))?;

            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(count = tools.len(), "Listed MCP tools");
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<MCPToolResult> {
        self.ensure_connected()?;

        let params = json!({
            "name": name,
            "arguments": arguments
        });
        let result = self.send_request("tools/call", params).await?;

        serde_json::from_value(result)
            .map_err(|e| MCPError::ToolCallFailed(format!("Failed to parse result of '{name}': {e}")))
    }

    async fn server_info(&self) -> Option<MCPServerInfo> {
        self.server_info.lock().await.clone()
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn build_headers(extra: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    header_map.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/event-stream"),
    );

    for (key, value) in extra {
        let name = HeaderName::from_str(key)
            .map_err(|e| MCPError::ConfigError(format!("Invalid header name '{key}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| MCPError::ConfigError(format!("Invalid header value for '{key}': {e}")))?;
        header_map.insert(name, value);
    }

    Ok(header_map)
}

/// Extract the JSON-RPC response with `id` from a response body
fn decode_response(content_type: Option<&str>, body: &str, id: u64) -> Result<Value> {
    let is_event_stream = content_type.is_some_and(|ct| ct.starts_with("text/event-stream"));
    if !is_event_stream {
        return serde_json::from_str(body)
            .map_err(|e| MCPError::RequestFailed(format!("Invalid JSON-RPC response: {e}")));
    }

    // Events end at a blank line; their data lines join with '\n'
    let mut data = String::new();
    for line in body.lines().chain(std::iter::once("")) {
        if line.is_empty() {
            if let Some(message) = serde_json::from_str::<Value>(&data)
                .ok()
                .filter(|message| message["id"].as_u64() == Some(id))
            {
                return Ok(message);
            }
            data.clear();
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    Err(MCPError::RequestFailed(format!(
        "No response with id {id} in event stream"
    )))
}

fn parse_server_info(result: &Value) -> MCPServerInfo {
    let field = |value: &Value| value.as_str().unwrap_or("unknown").to_string();
    MCPServerInfo {
        name: field(&result["serverInfo"]["name"]),
        version: field(&result["serverInfo"]["version"]),
        protocol_version: result["protocolVersion"]
            .as_str()
            .unwrap_or(PROTOCOL_VERSION)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_headers() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token123".to_string());

        let header_map = build_headers(&headers).unwrap();
        assert_eq!(header_map.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(
            header_map.get(ACCEPT).unwrap(),
            "application/json, text/event-stream"
        );
        assert_eq!(header_map.get("Authorization").unwrap(), "Bearer token123");
    }

    #[test]
    fn test_invalid_header_name() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let result = HttpMCPClient::with_headers("http://localhost/mcp", &headers, Duration::from_secs(5));
        assert!(matches!(result, Err(MCPError::ConfigError(_))));
    }

    #[test]
    fn test_decode_plain_json() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[]}}"#;
        let message = decode_response(Some("application/json"), body, 1).unwrap();
        assert_eq!(message["result"]["tools"], json!([]));
    }

    #[test]
    fn test_decode_event_stream_picks_matching_id() {
        let body = "event: message\r\n\
                    data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\r\n\
                    \r\n\
                    event: message\r\n\
                    data: {\"jsonrpc\":\"2.0\",\"id\":3,\r\n\
                    data: \"result\":{\"ok\":true}}\r\n";
        let message = decode_response(Some("text/event-stream; charset=utf-8"), body, 3).unwrap();
        assert_eq!(message["result"]["ok"], json!(true));
    }

    #[test]
    fn test_decode_event_stream_without_response() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{}}\n\n";
        let err = decode_response(Some("text/event-stream"), body, 8).unwrap_err();
        assert!(err.to_string().contains("id 8"));
    }

    #[test]
    fn test_parse_server_info_defaults() {
        let info = parse_server_info(&json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": { "name": "learn" }
        }));
        assert_eq!(info.name, "learn");
        assert_eq!(info.version, "unknown");
        assert_eq!(info.protocol_version, "2024-11-05");
    }

    #[tokio::test]
    async fn test_requires_handshake() {
        let client = HttpMCPClient::new("http://localhost:9/mcp", Duration::from_secs(1)).unwrap();
        assert!(!client.is_connected());
        assert!(matches!(client.list_tools().await, Err(MCPError::NotConnected)));
        assert!(matches!(
            client.call_tool("search", json!({})).await,
            Err(MCPError::NotConnected)
        ));
        assert!(client.server_info().await.is_none());
    }
}
