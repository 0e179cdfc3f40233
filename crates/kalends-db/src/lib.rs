//! Persistence for calendar entries and their recurrences in the legacy
//! `webcal_*` table layout.

pub mod db;
pub mod error;
pub mod model;
