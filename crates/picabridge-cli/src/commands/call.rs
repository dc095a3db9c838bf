//! Invoke a single tool outside the stdio server

use crate::error::{CliError, CliResult};
use crate::utils::{parse_tool_args, ColoredOutput};
use picabridge_core::BridgeConfig;
use picabridge_mcp::{AppState, ToolHandler};
use serde_json::Value;

pub struct CallCommand;

impl CallCommand {
    pub async fn run(config: &BridgeConfig, tool: &str, args: Option<&str>) -> CliResult<()> {
        let arguments = parse_tool_args(args)?;
        let app_state = AppState::from_config(config)?;
        let handler = ToolHandler::new(app_state.dispatcher.clone());

        let envelope = handler.call(tool, arguments).await?;
        println!("{}", serde_json::to_string_pretty(&envelope)?);

        if envelope.get("success") == Some(&Value::Bool(true)) {
            eprintln!("{}", ColoredOutput::success("✓ Tool call succeeded"));
            Ok(())
        } else {
            let message = envelope
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            eprintln!("{}", ColoredOutput::warning("Tool call reported failure"));
            Err(CliError::ToolFailed(message))
        }
    }
}
