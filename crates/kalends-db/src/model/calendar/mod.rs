//! Row models for the legacy entry tables.

pub mod entry;
pub mod exception;
pub mod repeat;
