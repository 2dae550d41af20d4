pub mod config;
pub mod error;
pub mod module;
pub mod observability;
