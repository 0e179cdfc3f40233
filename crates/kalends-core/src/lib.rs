//! Shared error, configuration and time types for the kalends workspace.

pub mod config;
pub mod error;
pub mod types;
