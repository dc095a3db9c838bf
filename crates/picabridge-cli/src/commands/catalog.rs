//! One-shot catalog queries

use crate::error::CliResult;
use picabridge_connectors::{CatalogGateway, PicaCatalogClient};
use picabridge_core::BridgeConfig;
use serde_json::json;
use tracing::debug;

pub struct CatalogCommand {
    client: PicaCatalogClient,
}

impl CatalogCommand {
    pub fn new(config: &BridgeConfig) -> CliResult<Self> {
        Ok(Self {
            client: PicaCatalogClient::new(config)?,
        })
    }

    /// Connections and connector definitions; either list failing fails the command
    pub async fn connections(&self) -> CliResult<()> {
        let (connections, definitions) = tokio::try_join!(
            self.client.list_connections(),
            self.client.list_connection_definitions()
        )?;
        debug!(
            "Fetched {} connections and {} connectors",
            connections.len(),
            definitions.len()
        );

        print_json(&json!({
            "connections": connections,
            "connectors": definitions,
        }))
    }

    pub async fn actions(&self, platform: &str) -> CliResult<()> {
        let actions = self.client.list_actions_for_platform(platform).await?;
        print_json(&json!({ "platform": platform, "actions": actions }))
    }

    pub async fn knowledge(&self, action_id: &str) -> CliResult<()> {
        match self.client.get_action_by_id(action_id).await? {
            Some(action) => print_json(&json!({ "action": action })),
            None => Err(picabridge_connectors::ConnectorError::ActionNotFound(
                action_id.to_string(),
            )
            .into()),
        }
    }
}

fn print_json(value: &serde_json::Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
