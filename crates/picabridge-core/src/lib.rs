pub mod config;
pub mod error;
pub mod sanitization;
pub mod types;

// Re-export commonly used types
pub use config::BridgeConfig;
pub use error::{CoreError, CoreResult};
pub use sanitization::{
    header_names, is_sensitive_header, mask_headers, redact_secret, redact_secret_in_json,
    SECRET_ENV_VAR, SECRET_PLACEHOLDER,
};
pub use types::{
    ActionDescriptor, BodyMode, ConnectionRef, ConnectorDefinition, EncodedBody, FormField,
    HeaderMap, InvocationRequest, Payload, RequestDescriptor, set_header,
};

/// Header carrying the platform secret on every upstream call
pub const SECRET_HEADER: &str = "x-pica-secret";
/// Routing header naming the stored connection
pub const CONNECTION_KEY_HEADER: &str = "x-pica-connection-key";
/// Routing header naming the cataloged action
pub const ACTION_ID_HEADER: &str = "x-pica-action-id";
