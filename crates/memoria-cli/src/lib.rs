//! Memoria command-line interface.

pub mod bootstrap;
pub mod commands;

use clap::{Parser, Subcommand};
use memoria_core::config::LoggingConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Memoria - retrieval-augmented task agent
#[derive(Parser)]
#[command(name = "memoria")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "MEMORIA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Process one or more tasks with retrieved context
    Task(commands::task::TaskArgs),

    /// Store information in memory
    Remember(commands::remember::RememberArgs),

    /// Retrieve memories similar to a query
    Recall(commands::recall::RecallArgs),

    /// Delete a memory by id
    Forget {
        /// Memory id (see `memoria id`)
        id: String,
    },

    /// Print the content id of a text
    Id {
        /// Text to address
        text: String,
    },

    /// Check configuration, embeddings and the vector store
    Doctor,

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Task(args) => commands::task::run(args, config_path).await,
        Commands::Remember(args) => commands::remember::run(args, config_path).await,
        Commands::Recall(args) => commands::recall::run(args, config_path).await,
        Commands::Forget { id } => commands::forget::run(&id, config_path).await,
        Commands::Id { text } => {
            println!("{}", memoria_memory::content_id(&text));
            Ok(())
        }
        Commands::Doctor => commands::doctor::run(config_path).await,
        Commands::Config(args) => commands::config::run(args, config_path),
        Commands::Version => {
            println!("memoria {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Filter directive for the given verbosity and configured level.
pub fn log_directive(verbose: u8, logging: &LoggingConfig) -> String {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    format!("memoria={}", level)
}

/// Initialize tracing. `MEMORIA_LOG` takes precedence over flags and config.
pub fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(memoria_core::env::vars::MEMORIA_LOG)
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose, logging)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
