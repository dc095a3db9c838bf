//! Utility functions for the CLI

use crate::error::{CliError, CliResult};
use colored::{ColoredString, Colorize};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize tracing on stderr; stdout belongs to command output and the stdio transport
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }
}

/// Parse the `--args` JSON for a tool call; absent means an empty object
pub fn parse_tool_args(raw: Option<&str>) -> CliResult<serde_json::Value> {
    match raw {
        None => Ok(serde_json::json!({})),
        Some(text) => {
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|e| CliError::InvalidArgument(format!("Invalid JSON for --args: {}", e)))?;
            if !value.is_object() {
                return Err(CliError::InvalidArgument(
                    "--args must be a JSON object".to_string(),
                ));
            }
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_args() {
        assert_eq!(parse_tool_args(None).unwrap(), serde_json::json!({}));
        assert_eq!(
            parse_tool_args(Some(r#"{"platform": "gmail"}"#)).unwrap()["platform"],
            "gmail"
        );
        assert!(parse_tool_args(Some("[1, 2]")).is_err());
        assert!(parse_tool_args(Some("{oops")).is_err());
    }
}
