//! # linear-context
//!
//! An MCP (Model Context Protocol) server that exposes Linear issues, teams and
//! comments to AI assistants.
//!
//! ## Features
//!
//! - Tools: list/create/update/search issues, list teams, add comments
//! - Issue resources addressable as `issue://<issueId>`
//! - Newline-delimited JSON-RPC over stdio
//! - A small MCP client for poking at a running server
//!
//! ## Usage
//!
//! ```bash
//! export LINEAR_API_KEY=lin_api_...
//!
//! # Start MCP server (for AI assistants)
//! linear-context serve
//!
//! # Check the credential
//! linear-context whoami
//!
//! # Spawn the server and exercise it
//! linear-context inspect
//! ```

pub mod config;
pub mod error;
pub mod linear;
pub mod mcp;

pub use config::Config;
pub use error::{LinearError, Result};
pub use linear::{LinearApi, LinearClient};
