//! Error handling for the MCP layer

use crate::jsonrpc::JsonRpcError;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur in MCP operations
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Core error: {0}")]
    Core(#[from] picabridge_core::CoreError),

    #[error("{0}")]
    Connector(#[from] picabridge_connectors::ConnectorError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::InvalidArguments(msg) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({
                    "message": msg
                }))
            }
            McpError::ToolNotFound(msg) => {
                JsonRpcError::method_not_found().with_data(serde_json::json!({
                    "message": format!("Unknown tool: {}", msg)
                }))
            }
            McpError::Serialization(e) => JsonRpcError::parse_error().with_data(serde_json::json!({
                "message": e.to_string()
            })),
            _ => JsonRpcError::internal_error().with_data(serde_json::json!({
                "message": self.to_string()
            })),
        }
    }
}
