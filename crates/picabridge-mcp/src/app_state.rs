//! Application state management for MCP server

use picabridge_connectors::{ActionDispatcher, CatalogGateway, CatalogStore, PicaCatalogClient};
use picabridge_core::BridgeConfig;
use std::sync::Arc;

/// Shared application state for MCP server
///
/// Holds the dispatcher, which in turn owns the catalog cache the tools read from.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ActionDispatcher>,
}

impl AppState {
    /// Wire the upstream catalog client, cache and dispatcher from configuration
    pub fn from_config(config: &BridgeConfig) -> crate::McpResult<Self> {
        let gateway: Arc<dyn CatalogGateway> = Arc::new(PicaCatalogClient::new(config)?);
        Self::with_gateway(config, gateway)
    }

    /// Same as [`AppState::from_config`] with a caller-provided catalog gateway
    pub fn with_gateway(
        config: &BridgeConfig,
        gateway: Arc<dyn CatalogGateway>,
    ) -> crate::McpResult<Self> {
        let catalog = Arc::new(CatalogStore::new(gateway, config.catalog_ttl()));
        let dispatcher = ActionDispatcher::new(config, catalog)?;
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Populate the catalog cache ahead of the first tool call
    pub async fn warm_up(&self) {
        self.dispatcher.catalog().refresh().await;
    }
}
