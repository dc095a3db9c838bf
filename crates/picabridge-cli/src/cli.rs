//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use picabridge_core::BridgeConfig;
use std::path::PathBuf;

use crate::error::CliResult;

#[derive(Parser)]
#[command(
    name = "picabridge",
    about = "picabridge - passthrough action bridge for AI agents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Upstream platform base URL
    #[arg(long, env = "PICA_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Platform secret sent as x-pica-secret
    #[arg(long, env = "PICA_SECRET", hide_env_values = true, global = true)]
    pub secret: Option<String>,

    /// TOML configuration file; flags and environment override its values
    #[arg(long, env = "PICABRIDGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Seconds before the cached connection lists are refetched
    #[arg(long, env = "PICA_CATALOG_TTL_SECS", global = true)]
    pub catalog_ttl_secs: Option<u64>,

    /// `limit` sent on catalog list requests
    #[arg(long, env = "PICA_PAGE_LIMIT", global = true)]
    pub page_limit: Option<u32>,

    /// Connect timeout for upstream requests, in milliseconds
    #[arg(long, global = true)]
    pub connect_timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the MCP tools over stdio
    Serve,

    /// List vault connections and available connectors
    Connections,

    /// List supported actions for a platform
    Actions {
        #[arg(help = "Platform name (e.g., gmail)")]
        platform: String,
    },

    /// Show the full knowledge for one action
    Knowledge {
        #[arg(help = "Action id")]
        action_id: String,
    },

    /// Invoke one tool and print its envelope
    Call {
        #[arg(help = "Tool name (e.g., execute_action)")]
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
}

impl Cli {
    /// Resolve configuration: file (or defaults), then flags and environment, then validate
    pub fn bridge_config(&self) -> CliResult<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::read_toml_file(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(secret) = &self.secret {
            config.secret = secret.clone();
        }
        if let Some(ttl) = self.catalog_ttl_secs {
            config.catalog_ttl_secs = ttl;
        }
        if let Some(limit) = self.page_limit {
            config.page_limit = limit;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}
