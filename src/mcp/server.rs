//! MCP JSON-RPC 2.0 server over stdio.

use super::dispatcher::Dispatcher;
use super::resources::{resource_templates, ResourceReader};
use super::tools::get_tools;
use crate::error::{LinearError, Result};
use crate::linear::LinearApi;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "linear-context";

/// MCP Server exposing Linear tools and issue resources.
pub struct McpServer {
    dispatcher: Dispatcher,
    resources: ResourceReader,
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<LinearError> for JsonRpcError {
    fn from(e: LinearError) -> Self {
        JsonRpcError::new(e.rpc_code(), e.to_string())
    }
}

type RpcResult = std::result::Result<Value, JsonRpcError>;

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: Option<String>,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: Option<String>,
}

impl McpServer {
    /// Create a new MCP server around a Linear API handle.
    pub fn new(api: Arc<dyn LinearApi>) -> Self {
        Self {
            dispatcher: Dispatcher::new(api.clone()),
            resources: ResourceReader::new(api),
        }
    }

    /// Run the MCP server over stdio.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("{} MCP server started", SERVER_NAME);
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC until `reader` hits EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).await? == 0 {
                break;
            }

            // A line that is not UTF-8 is dropped; the stream stays usable.
            let line = match std::str::from_utf8(&buffer) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Skipping non UTF-8 input line: {}", e);
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Unparseable request: {}", e);
                    let error_response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        id: None,
                        result: None,
                        error: Some(JsonRpcError::new(-32700, format!("Parse error: {}", e))),
                    };
                    write_message(&mut writer, &error_response).await?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request).await {
                write_message(&mut writer, &response).await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Notifications carry no id and get no reply.
        let Some(id) = request.id else {
            tracing::debug!("Notification {}", request.method);
            return None;
        };

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            "resources/list" => self.handle_resources_list().await,
            "resources/read" => self.handle_resources_read(request.params).await,
            "resources/templates/list" => self.handle_resource_templates(),
            _ => Err(JsonRpcError::new(
                -32601,
                format!("Method not found: {}", request.method),
            )),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: Some(id),
                result: Some(value),
                error: None,
            },
            Err(error) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: Some(id),
                result: None,
                error: Some(error),
            },
        })
    }

    fn handle_initialize(&self) -> RpcResult {
        Ok(serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    fn handle_tools_list(&self) -> RpcResult {
        Ok(serde_json::json!({ "tools": get_tools() }))
    }

    async fn handle_tools_call(&self, params: Value) -> RpcResult {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::new(-32602, format!("Invalid params: {}", e)))?;
        let name = params
            .name
            .ok_or_else(|| JsonRpcError::new(-32602, "Missing tool name"))?;

        let result = self.dispatcher.call(&name, params.arguments).await;
        serde_json::to_value(result).map_err(|e| LinearError::from(e).into())
    }

    async fn handle_resources_list(&self) -> RpcResult {
        let resources = self.resources.list().await?;
        Ok(serde_json::json!({ "resources": resources }))
    }

    async fn handle_resources_read(&self, params: Value) -> RpcResult {
        let params: ReadResourceParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::new(-32602, format!("Invalid params: {}", e)))?;
        let uri = params
            .uri
            .ok_or_else(|| JsonRpcError::new(-32602, "Missing resource uri"))?;

        let contents = self.resources.read(&uri).await.map_err(|e| {
            tracing::warn!("Reading {} failed: {}", uri, e);
            JsonRpcError::from(e)
        })?;
        Ok(serde_json::json!({ "contents": [contents] }))
    }

    fn handle_resource_templates(&self) -> RpcResult {
        Ok(serde_json::json!({ "resourceTemplates": resource_templates() }))
    }
}

/// Write one JSON message followed by a newline.
pub(crate) async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
