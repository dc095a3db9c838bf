pub mod catalog;
pub mod error;
pub mod http;

// Re-export commonly used types
pub use catalog::{
    CatalogGateway, CatalogSnapshot, CatalogStore, ConnectionLookup, PicaCatalogClient,
};
pub use error::{ConnectorError, ConnectorResult};
pub use http::{
    ActionDispatcher, ExecuteOutcome, GenerateOutcome, HttpExecutionResult, HttpExecutor,
    RequestEcho,
};
