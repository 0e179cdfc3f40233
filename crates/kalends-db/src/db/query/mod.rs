pub mod entry;
pub mod repeat;
