//! Tool definitions and the handler that turns tool calls into success/failure envelopes

use crate::error::{McpError, McpResult};
use crate::mcp::{Tool, ToolInputSchema};
use indexmap::IndexMap;
use picabridge_connectors::{ActionDispatcher, ConnectorError};
use picabridge_core::{ActionDescriptor, HeaderMap, InvocationRequest, Payload};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub const TOOL_LIST_CONNECTIONS: &str = "list_connections_and_connectors";
pub const TOOL_GET_ACTIONS: &str = "get_available_actions";
pub const TOOL_GET_KNOWLEDGE: &str = "get_action_knowledge";
pub const TOOL_EXECUTE: &str = "execute_action";
pub const TOOL_GENERATE: &str = "generate_action_config";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetAvailableActionsArgs {
    platform: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetActionKnowledgeArgs {
    action_id: String,
}

#[derive(Debug, Deserialize)]
struct ActionRefArgs {
    id: String,
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateActionConfigArgs {
    platform: String,
    action: ActionRefArgs,
    method: String,
    connection_key: String,
    #[serde(default)]
    data: Option<Payload>,
    #[serde(default)]
    path_variables: Option<IndexMap<String, Value>>,
    #[serde(default)]
    query_params: Option<IndexMap<String, Value>>,
    #[serde(default)]
    headers: Option<HeaderMap>,
    #[serde(default)]
    is_form_data: bool,
    #[serde(default)]
    is_form_url_encoded: bool,
}

impl GenerateActionConfigArgs {
    fn into_parts(self) -> (String, InvocationRequest) {
        let request = InvocationRequest {
            action_id: self.action.id,
            connection_key: self.connection_key,
            method: self.method,
            path: self.action.path,
            data: self.data,
            path_variables: self.path_variables,
            query_params: self.query_params,
            headers: self.headers,
            is_form_data: self.is_form_data,
            is_form_url_encoded: self.is_form_url_encoded,
        };
        (self.platform, request)
    }
}

/// Catalog listing entry; the knowledge blob is only returned by `get_action_knowledge`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionSummary<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

impl<'a> From<&'a ActionDescriptor> for ActionSummary<'a> {
    fn from(action: &'a ActionDescriptor) -> Self {
        Self {
            id: &action.id,
            title: action.title.as_deref(),
            method: action.method.as_deref(),
            path: &action.path_template,
            tags: action.tags.as_deref(),
        }
    }
}

/// Build a `{ "success": true, ...fields }` envelope
pub fn envelope_ok(fields: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert("success".to_string(), Value::Bool(true));
    match fields {
        Value::Object(map) => envelope.extend(map),
        Value::Null => {}
        other => {
            envelope.insert("data".to_string(), other);
        }
    }
    Value::Object(envelope)
}

/// Build a `{ "success": false, "error": message }` envelope
pub fn envelope_err(message: impl Into<String>) -> Value {
    json!({ "success": false, "error": message.into() })
}

/// Routes tool calls to the dispatcher and catalog
#[derive(Clone)]
pub struct ToolHandler {
    dispatcher: Arc<ActionDispatcher>,
}

impl ToolHandler {
    pub fn new(dispatcher: Arc<ActionDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Invoke a tool by name.
    ///
    /// Only an unknown tool name is an `Err`; every other failure is reported in the
    /// returned envelope.
    pub async fn call(&self, name: &str, arguments: Value) -> McpResult<Value> {
        debug!("Calling tool: {}", name);
        let outcome = match name {
            TOOL_LIST_CONNECTIONS => self.list_connections_and_connectors().await,
            TOOL_GET_ACTIONS => self.get_available_actions(arguments).await,
            TOOL_GET_KNOWLEDGE => self.get_action_knowledge(arguments).await,
            TOOL_EXECUTE => self.execute_action(arguments).await,
            TOOL_GENERATE => self.generate_action_config(arguments).await,
            other => return Err(McpError::ToolNotFound(other.to_string())),
        };

        Ok(match outcome {
            Ok(fields) => envelope_ok(fields),
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                envelope_err(e.to_string())
            }
        })
    }

    async fn list_connections_and_connectors(&self) -> McpResult<Value> {
        let snapshot = self.dispatcher.catalog().snapshot().await;
        Ok(json!({
            "connections": snapshot.connections,
            "connectors": snapshot.definitions,
            "degraded": snapshot.is_degraded(),
        }))
    }

    async fn get_available_actions(&self, arguments: Value) -> McpResult<Value> {
        let args: GetAvailableActionsArgs = parse_args(arguments)?;
        require("platform", &args.platform)?;

        let actions = self
            .dispatcher
            .catalog()
            .list_actions_for_platform(&args.platform)
            .await?;
        let summaries: Vec<ActionSummary<'_>> = actions.iter().map(ActionSummary::from).collect();

        Ok(json!({
            "platform": args.platform,
            "actions": summaries,
        }))
    }

    async fn get_action_knowledge(&self, arguments: Value) -> McpResult<Value> {
        let args: GetActionKnowledgeArgs = parse_args(arguments)?;
        require("actionId", &args.action_id)?;

        let action = self
            .dispatcher
            .catalog()
            .get_action_by_id(&args.action_id)
            .await?;
        Ok(json!({ "action": action }))
    }

    async fn execute_action(&self, arguments: Value) -> McpResult<Value> {
        let request: InvocationRequest = parse_args(arguments)?;
        let outcome = self.dispatcher.execute(request).await?;
        Ok(serde_json::to_value(outcome)?)
    }

    async fn generate_action_config(&self, arguments: Value) -> McpResult<Value> {
        let args: GenerateActionConfigArgs = parse_args(arguments)?;
        require("platform", &args.platform)?;

        let (platform, request) = args.into_parts();
        let outcome = self.dispatcher.generate(&platform, request).await?;
        Ok(serde_json::to_value(outcome)?)
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> McpResult<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments(e.to_string()))
}

fn require(name: &str, value: &str) -> McpResult<()> {
    if value.trim().is_empty() {
        return Err(McpError::Connector(ConnectorError::InvalidInput(format!(
            "{} is required",
            name
        ))));
    }
    Ok(())
}

fn invocation_properties() -> Map<String, Value> {
    let properties = json!({
        "method": {
            "type": "string",
            "description": "HTTP method (GET, POST, PUT, PATCH, DELETE), case-insensitive"
        },
        "connectionKey": {
            "type": "string",
            "description": "Key of the stored connection to route through"
        },
        "data": {
            "description": "Request payload. Fields named in the path template are moved into the path."
        },
        "pathVariables": {
            "type": "object",
            "description": "Values for {{name}} placeholders; take precedence over data fields"
        },
        "queryParams": {
            "type": "object",
            "description": "Query string parameters"
        },
        "headers": {
            "type": "object",
            "description": "Extra request headers. Routing and secret headers cannot be overridden."
        },
        "isFormData": {
            "type": "boolean",
            "description": "Send data as multipart/form-data"
        },
        "isFormUrlEncoded": {
            "type": "boolean",
            "description": "Send data as application/x-www-form-urlencoded"
        }
    });
    match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn schema(properties: Map<String, Value>, required: &[&str]) -> ToolInputSchema {
    ToolInputSchema {
        r#type: "object".to_string(),
        properties: Value::Object(properties),
        required: required.iter().map(|s| s.to_string()).collect(),
    }
}

/// Tools advertised by `tools/list`
pub fn tool_definitions() -> Vec<Tool> {
    let mut execute = invocation_properties();
    execute.insert(
        "actionId".to_string(),
        json!({"type": "string", "description": "Id of the action to execute"}),
    );
    execute.insert(
        "path".to_string(),
        json!({"type": "string", "description": "Action path template, e.g. /users/{{userId}}/messages"}),
    );

    let mut generate = invocation_properties();
    generate.insert(
        "platform".to_string(),
        json!({"type": "string", "description": "Platform the connection belongs to"}),
    );
    generate.insert(
        "action".to_string(),
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "path": {"type": "string"}
            },
            "required": ["id", "path"]
        }),
    );

    vec![
        Tool {
            name: TOOL_LIST_CONNECTIONS.to_string(),
            description: "List the user's connections and the connectors the platform supports"
                .to_string(),
            input_schema: schema(Map::new(), &[]),
        },
        Tool {
            name: TOOL_GET_ACTIONS.to_string(),
            description: "List the supported actions for a platform".to_string(),
            input_schema: schema(
                [(
                    "platform".to_string(),
                    json!({"type": "string", "description": "Platform name, e.g. gmail"}),
                )]
                .into_iter()
                .collect(),
                &["platform"],
            ),
        },
        Tool {
            name: TOOL_GET_KNOWLEDGE.to_string(),
            description: "Fetch the full documentation for one action".to_string(),
            input_schema: schema(
                [(
                    "actionId".to_string(),
                    json!({"type": "string", "description": "Action id from get_available_actions"}),
                )]
                .into_iter()
                .collect(),
                &["actionId"],
            ),
        },
        Tool {
            name: TOOL_EXECUTE.to_string(),
            description: "Send a request for an action through the passthrough API and return the response"
                .to_string(),
            input_schema: schema(execute, &["actionId", "connectionKey", "method", "path"]),
        },
        Tool {
            name: TOOL_GENERATE.to_string(),
            description: "Build the request for an action without sending it and return a code sample that reads the secret from PICA_SECRET"
                .to_string(),
            input_schema: schema(generate, &["platform", "action", "method", "connectionKey"]),
        },
    ]
}
