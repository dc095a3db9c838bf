//! MCP server: JSON-RPC dispatch and the stdio transport

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::{
    jsonrpc::{
        error_response, is_batch, success_response, JsonRpcError, JsonRpcRequest,
        JsonRpcResponse, JSONRPC_VERSION,
    },
    mcp::{
        Implementation, InitializeRequest, InitializeResponse, ServerCapabilities,
        TextContent, ToolsCallRequest, ToolsCallResponse, ToolsCapability, ToolsListResponse,
        LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE, METHOD_PING, METHOD_TOOLS_CALL,
        METHOD_TOOLS_LIST, SUPPORTED_PROTOCOL_VERSIONS,
    },
    tools::{tool_definitions, ToolHandler},
    AppState, McpError, McpResult,
};

/// MCP Server
pub struct McpServer {
    pub app_state: AppState,
    tools: ToolHandler,
}

impl McpServer {
    pub fn new(app_state: AppState) -> Self {
        let tools = ToolHandler::new(app_state.dispatcher.clone());
        Self { app_state, tools }
    }

    /// Process a single MCP message.
    ///
    /// Returns `Ok(None)` for notifications. Handler failures are turned into JSON-RPC
    /// error responses carrying the request id; only unparsable input is an `Err`.
    pub async fn process_message(&self, body: &[u8]) -> McpResult<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = serde_json::from_slice(body).map_err(|e| {
            error!("Failed to parse JSON-RPC request: {}", e);
            McpError::Serialization(e)
        })?;

        debug!("Processing method: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Ok(Some(error_response(
                request.id,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Invalid JSON-RPC version"})),
            )));
        }

        if request.is_notification() {
            debug!("Received notification {}, ignoring", request.method);
            return Ok(None);
        }

        let result = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(&request),
            METHOD_PING => Ok(serde_json::json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(),
            METHOD_TOOLS_CALL => self.handle_tools_call(&request).await,
            _ => {
                return Ok(Some(error_response(
                    request.id,
                    JsonRpcError::method_not_found()
                        .with_data(serde_json::json!({"method": request.method})),
                )))
            }
        };

        let response = match result {
            Ok(value) => success_response(request.id, value),
            Err(e) => {
                error!("Error handling {}: {}", request.method, e);
                error_response(request.id, e.to_jsonrpc_error())
            }
        };
        Ok(Some(response))
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let init_request: InitializeRequest = request
            .params_as()
            .map_err(|e| McpError::InvalidArguments(e.to_string()))?;

        if let Some(client) = &init_request.client_info {
            info!("Client connected: {} {}", client.name, client.version);
        }

        let protocol_version =
            if SUPPORTED_PROTOCOL_VERSIONS.contains(&init_request.protocol_version.as_str()) {
                init_request.protocol_version
            } else {
                LATEST_PROTOCOL_VERSION.to_string()
            };

        let response = InitializeResponse {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: Implementation {
                name: "picabridge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Discover connections and actions, read an action's knowledge, then either \
                 execute it or generate a request that reads the secret from PICA_SECRET."
                    .to_string(),
            ),
        };

        Ok(serde_json::to_value(response)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let response = ToolsListResponse {
            tools: tool_definitions(),
        };
        Ok(serde_json::to_value(response)?)
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let call_request: ToolsCallRequest = request
            .params_as()
            .map_err(|e| McpError::InvalidArguments(e.to_string()))?;

        let envelope = self
            .tools
            .call(&call_request.name, call_request.arguments.unwrap_or(Value::Null))
            .await?;

        let is_error = envelope.get("success") != Some(&Value::Bool(true));
        let response = ToolsCallResponse {
            content: vec![TextContent::new(serde_json::to_string_pretty(&envelope)?)],
            structured_content: envelope,
            is_error,
        };
        Ok(serde_json::to_value(response)?)
    }
}

/// Serve line-delimited JSON-RPC from `reader`, writing one response line per request
pub async fn serve_io<R, W>(server: &McpServer, reader: R, mut writer: W) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!("Processing line: {}", line);

        let response = if is_batch(line) {
            error!("Batch requests are not supported");
            Some(error_response(
                None,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Batch requests are not supported"})),
            ))
        } else {
            match server.process_message(line.as_bytes()).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Error processing message: {}", e);
                    Some(error_response(None, e.to_jsonrpc_error()))
                }
            }
        };

        if let Some(response) = response {
            let mut response_json = serde_json::to_string(&response)?;
            response_json.push('\n');
            writer.write_all(response_json.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}

/// Serve MCP over stdio
pub async fn serve_stdio(app_state: AppState) -> McpResult<()> {
    info!("Starting picabridge MCP server (stdio mode)");

    let server = McpServer::new(app_state);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_io(&server, stdin, tokio::io::stdout()).await?;

    info!("MCP server stopped");
    Ok(())
}
