use picabridge_core::CoreError;
use serde_json::Value as JsonValue;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Missing value for path variable '{0}'")]
    MissingPathVariable(String),

    #[error("Missing required path variables: {}", .0.join(", "))]
    MissingPathVariables(Vec<String>),

    #[error("{}", format_unknown_connection(.key, .platform.as_deref()))]
    UnknownConnection {
        key: String,
        platform: Option<String>,
    },

    #[error("{}", format_upstream_failure(.message, .payload.as_ref()))]
    UpstreamRequestFailed {
        message: String,
        payload: Option<JsonValue>,
    },

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_upstream_failure(message: &str, payload: Option<&JsonValue>) -> String {
    match payload {
        Some(payload) => format!("{}: {}", message, payload),
        None => message.to_string(),
    }
}

fn format_unknown_connection(key: &str, platform: Option<&str>) -> String {
    match platform {
        Some(platform) => format!(
            "Connection '{}' not found for platform '{}'. Add a {} connection first.",
            key, platform, platform
        ),
        None => format!("Connection '{}' not found", key),
    }
}

impl ConnectorError {
    /// Upstream failure carrying whatever body the remote side returned
    pub fn upstream(message: impl Into<String>, payload: Option<JsonValue>) -> Self {
        ConnectorError::UpstreamRequestFailed {
            message: message.into(),
            payload,
        }
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
