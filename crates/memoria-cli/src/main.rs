//! Memoria CLI entry point.

use clap::Parser;
use memoria_cli::{init_logging, run, Cli};
use memoria_core::config::Config;
use std::path::Path;
use tracing::{debug, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // .env never overrides the real environment
    let dotenv = memoria_core::env::load_dotenv(Path::new(".env"));

    // Logging settings come from config when it loads; commands report
    // load errors themselves
    let logging = Config::resolve(cli.config.as_deref())
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(cli.verbose, &logging);

    match dotenv {
        Ok(0) => {}
        Ok(loaded) => debug!("Loaded {} variables from .env", loaded),
        Err(e) => warn!("Failed to read .env: {}", e),
    }

    // Run the command
    run(cli).await
}
