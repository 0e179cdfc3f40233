//! Kalends integration test support.
//!
//! Re-exports the workspace crates so integration tests reach every layer
//! through one dependency.

pub use kalends_core as core;
pub use kalends_db as db;
pub use kalends_rfc as rfc;
pub use kalends_service as service;
