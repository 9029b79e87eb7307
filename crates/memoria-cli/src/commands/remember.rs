//! Storing memories.

use crate::bootstrap;
use anyhow::Context;
use clap::Args;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Remember command arguments.
#[derive(Args)]
pub struct RememberArgs {
    /// Text to store
    #[arg(required_unless_present = "file")]
    pub text: Option<String>,

    /// Store each non-empty line of a file as its own memory
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Extra metadata as key=value (repeatable)
    #[arg(short, long, value_parser = parse_key_val)]
    pub meta: Vec<(String, String)>,
}

/// Parse a `key=value` pair.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' in '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("invalid key=value: empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Lines worth storing from a seed file.
fn seed_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Run the remember command. Memories are tagged `type=manual_update`
/// unless `--meta type=...` says otherwise.
pub async fn run(args: RememberArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = bootstrap::load_config(config_path)?;
    let agent = bootstrap::build_agent(&config)?;
    let metadata: HashMap<String, String> = args.meta.into_iter().collect();

    let texts: Vec<String> = match (&args.file, args.text) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            seed_lines(&content).into_iter().map(str::to_string).collect()
        }
        (None, Some(text)) => vec![text],
        (None, None) => anyhow::bail!("Nothing to remember"),
    };

    for text in &texts {
        let id = agent.update_memory_with(text, metadata.clone()).await?;
        println!("{}", id);
    }

    if texts.len() > 1 {
        eprintln!("Stored {} memories", texts.len());
    }
    Ok(())
}
