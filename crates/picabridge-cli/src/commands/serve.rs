//! MCP server command

use anyhow::Result;
use picabridge_core::BridgeConfig;
use picabridge_mcp::{serve_stdio, AppState};
use tracing::info;

pub async fn execute(config: &BridgeConfig) -> Result<()> {
    info!("Starting picabridge MCP server");
    info!("Upstream: {}", config.normalized_base_url());

    let app_state = AppState::from_config(config)?;
    app_state.warm_up().await;

    serve_stdio(app_state).await?;
    Ok(())
}
