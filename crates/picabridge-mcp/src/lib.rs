//! picabridge MCP (Model Context Protocol) server
//!
//! Exposes the passthrough dispatcher and the upstream catalog as five MCP tools. Every
//! tool answers with a `{ "success": ... }` envelope; dispatch failures are reported inside
//! the envelope instead of as protocol errors.

pub mod app_state;
pub mod error;
pub mod jsonrpc;
pub mod mcp;
pub mod server;
pub mod tools;

// Re-export key types
pub use app_state::AppState;
pub use error::{McpError, McpResult};
pub use server::{serve_io, serve_stdio, McpServer};
pub use tools::{tool_definitions, ToolHandler};
