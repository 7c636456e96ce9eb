//! MCP (Model Context Protocol) server for AI assistant integration.

pub mod client;
pub mod dispatcher;
pub mod projection;
pub mod resources;
pub mod server;
pub mod tools;

pub use client::McpClient;
pub use dispatcher::{CallToolResult, Dispatcher};
pub use resources::ResourceReader;
pub use server::McpServer;
pub use tools::{get_tools, ToolName};
