//! picabridge CLI main entry point

use clap::Parser;
use picabridge_cli::{
    cli::{Cli, Commands},
    commands::{CallCommand, CatalogCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::info;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("picabridge v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.bridge_config()?;

    match &cli.command {
        Commands::Serve => picabridge_cli::commands::serve::execute(&config)
            .await
            .map_err(|e| e.into()),

        Commands::Connections => CatalogCommand::new(&config)?.connections().await,

        Commands::Actions { platform } => CatalogCommand::new(&config)?.actions(platform).await,

        Commands::Knowledge { action_id } => {
            CatalogCommand::new(&config)?.knowledge(action_id).await
        }

        Commands::Call { tool, args } => CallCommand::run(&config, tool, args.as_deref()).await,
    }
}
