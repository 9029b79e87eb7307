//! Similarity retrieval.

use crate::bootstrap;
use clap::Args;
use console::style;
use std::path::Path;

/// Recall command arguments.
#[derive(Args)]
pub struct RecallArgs {
    /// Query text
    pub query: String,

    /// Maximum number of memories
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,

    /// Show ids and similarity scores
    #[arg(long)]
    pub scores: bool,

    /// Print matches as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the recall command.
pub async fn run(args: RecallArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = bootstrap::load_config(config_path)?;
    let client = bootstrap::http_client(&config.http)?;
    let memory = bootstrap::build_memory(&config, &client)?;

    let matches = memory.retrieve_matches(&args.query, args.limit).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("{}", style("No memories found").dim());
        return Ok(());
    }

    for m in &matches {
        if args.scores {
            println!("{} {} {}", style(format!("{:.4}", m.score)).cyan(), style(&m.id).dim(), m.text);
        } else {
            println!("{}", m.text);
        }
    }
    Ok(())
}
