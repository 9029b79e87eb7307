//! CLI command implementations.

pub mod config;
pub mod doctor;
pub mod forget;
pub mod recall;
pub mod remember;
pub mod task;
