//! Minimal MCP client used by the `inspect` harness.

use super::server::{write_message, JsonRpcResponse, PROTOCOL_VERSION};
use crate::error::{LinearError, Result};
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// JSON-RPC client speaking newline-delimited MCP.
pub struct McpClient<R, W> {
    lines: Lines<R>,
    writer: W,
    next_id: u64,
}

impl McpClient<BufReader<ChildStdout>, ChildStdin> {
    /// Spawn `program` and talk to it over its stdio. Stderr is inherited.
    pub fn spawn(program: &std::path::Path, args: &[String]) -> Result<(Self, Child)> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LinearError::Config("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LinearError::Config("child stdout unavailable".to_string()))?;

        Ok((Self::new(BufReader::new(stdout), stdin), child))
    }
}

impl<R, W> McpClient<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
            next_id: 1,
        }
    }

    /// Send a request and wait for its response.
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        write_message(
            &mut self.writer,
            &json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }),
        )
        .await?;

        loop {
            let line = self.lines.next_line().await?.ok_or_else(|| {
                LinearError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "server closed the connection",
                ))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let response: JsonRpcResponse = serde_json::from_str(&line)?;
            if response.id != Some(json!(id)) {
                tracing::debug!("Skipping unrelated message: {}", line);
                continue;
            }

            if let Some(error) = response.error {
                return Err(LinearError::Protocol {
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(response.result.unwrap_or(Value::Null));
        }
    }

    /// Send a notification (no reply expected).
    pub async fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        write_message(
            &mut self.writer,
            &json!({ "jsonrpc": "2.0", "method": method, "params": params }),
        )
        .await
    }

    /// Perform the initialize handshake.
    pub async fn initialize(&mut self) -> Result<Value> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "linear-context-inspect",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await?;
        self.notify("notifications/initialized", json!({})).await?;
        Ok(result)
    }

    pub async fn list_tools(&mut self) -> Result<Value> {
        self.request("tools/list", json!({})).await
    }

    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<Value> {
        self.request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
    }

    pub async fn list_resources(&mut self) -> Result<Value> {
        self.request("resources/list", json!({})).await
    }

    pub async fn read_resource(&mut self, uri: &str) -> Result<Value> {
        self.request("resources/read", json!({ "uri": uri })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{fixtures, MockLinearApi};
    use crate::mcp::McpServer;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_end_to_end_over_duplex() {
        let mut mock = MockLinearApi::new();
        mock.expect_assigned_issues()
            .returning(|| Ok(vec![fixtures::issue("issue-1", "Fix login", 10)]));
        mock.expect_issue()
            .withf(|id| id == "issue-1")
            .returning(|_| Ok(Some(fixtures::issue("issue-1", "Fix login", 10))));

        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);
        let server = tokio::spawn(async move {
            McpServer::new(Arc::new(mock))
                .serve(BufReader::new(server_read), server_write)
                .await
        });

        let (client_read, client_write) = tokio::io::split(client_io);
        let mut client = McpClient::new(BufReader::new(client_read), client_write);

        let init = client.initialize().await.unwrap();
        assert_eq!(init["serverInfo"]["name"], "linear-context");

        let tools = client.list_tools().await.unwrap();
        assert_eq!(tools["tools"].as_array().unwrap().len(), 6);

        let resources = client.list_resources().await.unwrap();
        let uri = resources["resources"][0]["uri"].as_str().unwrap().to_string();
        assert_eq!(uri, "issue://issue-1");

        let contents = client.read_resource(&uri).await.unwrap();
        let issue: Value =
            serde_json::from_str(contents["contents"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(issue["title"], "Fix login");

        let err = client.read_resource("foo://x").await.unwrap_err();
        assert!(matches!(err, LinearError::Protocol { code: -32602, .. }));

        let unknown = client.call_tool("create_note", json!({})).await.unwrap();
        assert_eq!(unknown["isError"], true);

        drop(client);
        server.await.unwrap().unwrap();
    }
}
