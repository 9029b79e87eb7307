//! # memoria-core
//!
//! Core configuration and utilities for Memoria.
//!
//! This crate provides shared functionality used across all Memoria crates:
//!
//! - **Configuration**: Loading, environment overrides, and validation
//! - **Secrets**: Redacted credential handling
//! - **Utilities**: Path resolution and environment handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
