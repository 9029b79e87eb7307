//! Configuration management commands.

use clap::Args;
use memoria_core::config::Config;
use memoria_core::{paths, SecretString};
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with credentials masked
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::resolve(config_path)?;
            println!("{}", masked(config).to_json5()?);
        }

        ConfigCommand::Path => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => paths::config_file()?,
            };
            println!("{}", path.display());
        }

        ConfigCommand::Validate => match Config::resolve(config_path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => anyhow::bail!("Configuration error: {}", e),
            },
            Err(e) => anyhow::bail!("Failed to load config: {}", e),
        },
    }

    Ok(())
}

/// Replace every credential with its masked preview.
fn masked(mut config: Config) -> Config {
    for key in [
        &mut config.pinecone.api_key,
        &mut config.embeddings.api_key,
        &mut config.generation.api_key,
    ] {
        if let Some(secret) = key.as_mut() {
            *secret = SecretString::new(secret.masked());
        }
    }
    config
}
