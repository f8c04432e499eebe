use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use robotix_core::config::Config;
use robotix_core::service::http::{serve, AppState};

#[derive(Parser)]
#[command(name = "robotix", version, about = "Educational assistant chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        addr: Option<String>,
        /// Path to a JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("robotix=info".parse().unwrap())
                .add_directive("robotix_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, config } => cmd_serve(addr, config).await?,
    }

    Ok(())
}

async fn cmd_serve(addr: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let addr = addr.unwrap_or_else(|| config.server.bind.clone());
    let state = Arc::new(AppState::new(config));
    serve(&addr, state).await
}
