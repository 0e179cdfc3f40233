pub mod connection;
pub mod enums;
pub mod legacy;
pub mod map;
pub mod migrations;
pub mod query;
pub mod schema;
pub mod transaction;
