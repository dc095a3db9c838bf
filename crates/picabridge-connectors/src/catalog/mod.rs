//! Access to the upstream connection vault and action catalog

pub mod client;
pub mod store;

use crate::error::ConnectorResult;
use async_trait::async_trait;
use picabridge_core::{ActionDescriptor, ConnectionRef, ConnectorDefinition};

pub use client::PicaCatalogClient;
pub use store::{CatalogSnapshot, CatalogStore, ConnectionLookup};

/// Network-backed source of connections, connector definitions and action metadata
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Connections stored in the user's vault
    async fn list_connections(&self) -> ConnectorResult<Vec<ConnectionRef>>;
    /// Connectors the platform supports
    async fn list_connection_definitions(&self) -> ConnectorResult<Vec<ConnectorDefinition>>;
    /// Supported actions for one platform
    async fn list_actions_for_platform(&self, platform: &str)
        -> ConnectorResult<Vec<ActionDescriptor>>;
    /// Single action with its knowledge blob; `None` when the catalog has no such id
    async fn get_action_by_id(&self, id: &str) -> ConnectorResult<Option<ActionDescriptor>>;
}
