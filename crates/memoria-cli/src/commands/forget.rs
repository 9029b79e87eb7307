//! Memory deletion.

use crate::bootstrap;
use std::path::Path;

/// Delete one memory. Unknown ids succeed.
pub async fn run(id: &str, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = bootstrap::load_config(config_path)?;
    let client = bootstrap::http_client(&config.http)?;
    let memory = bootstrap::build_memory(&config, &client)?;

    memory.delete(id).await?;
    println!("Forgot {}", id);
    Ok(())
}
