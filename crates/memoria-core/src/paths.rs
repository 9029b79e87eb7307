//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Memoria base directory (`$MEMORIA_HOME` or `~/.memoria`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::MEMORIA_HOME) {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".memoria"))
}

/// Get the main config file path (`~/.memoria/memoria.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("memoria.json5"))
}

/// Get the default local vector store file (`~/.memoria/memories.json`).
pub fn local_store_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("memories.json"))
}
