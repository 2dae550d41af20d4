//! secfuzz package manager client.

pub mod config;
pub mod login;

pub use config::{AuthEntry, ConfigError, ConfigStore, PmConfig};
pub use login::{
    login, prompt_credentials, Authenticator, AuthResponse, Credentials, HttpAuthenticator,
    LoginError,
};
