//! Unified configuration layer.
//!
//! All environment reads go through this module; callers use the typed
//! structs instead of `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `ObservabilityConfig`, `PathsConfig`
//! - `env_keys`: key constants and their aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv};
pub use schema::{ObservabilityConfig, PathsConfig};
