//! `pm login`: exchange username and password for a repository token.

use std::io;
use std::time::Duration;

use chrono::Utc;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{AuthEntry, ConfigError, ConfigStore};

/// Path of the token endpoint, relative to the repository URL.
pub const AUTH_PATH: &str = "/api/auth/";

#[derive(Debug, Error)]
pub enum LoginError {
    /// The repository answered with something other than 200.
    #[error("{0}")]
    Rejected(String),
    #[error("no auth token in response")]
    NoToken,
    #[error("Cannot reach repository at {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Raw answer from the token endpoint.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub status: u16,
    pub reason: String,
    /// `Value::Null` when the body was not JSON.
    pub body: Value,
}

/// Sends credentials to a repository.
pub trait Authenticator {
    fn authenticate(&self, url: &str, credentials: &Credentials) -> Result<AuthResponse, LoginError>;
}

/// ureq-backed [`Authenticator`].
pub struct HttpAuthenticator {
    agent: ureq::Agent,
}

impl Default for HttpAuthenticator {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(10))
                .timeout_read(Duration::from_secs(30))
                .build(),
        }
    }
}

impl Authenticator for HttpAuthenticator {
    fn authenticate(&self, url: &str, credentials: &Credentials) -> Result<AuthResponse, LoginError> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let response = match self.agent.post(url).send_json(&body) {
            Ok(r) => r,
            Err(ureq::Error::Status(_, r)) => r,
            Err(e @ ureq::Error::Transport(_)) => {
                return Err(LoginError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let status = response.status();
        let reason = response.status_text().to_string();
        let body = response.into_json::<Value>().unwrap_or(Value::Null);
        Ok(AuthResponse {
            status,
            reason,
            body,
        })
    }
}

/// Message for a refused login: `non_field_errors` joined by `;`, then
/// `detail`, then the HTTP reason.
pub fn extract_login_error(reason: &str, body: &Value) -> String {
    if let Some(errors) = body.get("non_field_errors") {
        match errors {
            Value::Array(items) => {
                return items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(";")
            }
            Value::String(s) => return s.clone(),
            _ => {}
        }
    }
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return detail.to_string();
    }
    reason.to_string()
}

/// Token from a 200 response.
pub fn token_from_response(response: &AuthResponse) -> Result<String, LoginError> {
    if response.status != 200 {
        return Err(LoginError::Rejected(extract_login_error(
            &response.reason,
            &response.body,
        )));
    }
    response
        .body
        .get("token")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(LoginError::NoToken)
}

/// Log in to `repository` and persist the token. Nothing is written on failure.
pub fn login(
    auth: &dyn Authenticator,
    store: &ConfigStore,
    repository: &str,
    credentials: &Credentials,
) -> Result<AuthEntry, LoginError> {
    let mut config = store.load()?;
    let url = format!("{}{}", repository.trim_end_matches('/'), AUTH_PATH);
    tracing::debug!("POST {}", url);

    let response = auth.authenticate(&url, credentials)?;
    let token = token_from_response(&response)?;

    let entry = AuthEntry {
        username: credentials.username.clone(),
        token,
        logged_in_at: Utc::now(),
    };
    config.repository = Some(repository.to_string());
    config.auth = Some(entry.clone());
    store.save(&config)?;
    tracing::info!("Login successful");
    Ok(entry)
}

/// Ask for username and password at the terminal. `None` when the user
/// presses Ctrl+C or input ends.
pub fn prompt_credentials() -> io::Result<Option<Credentials>> {
    let mut editor =
        DefaultEditor::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let Some(username) = ask(|l| editor.readline(l), "Enter username: ")? else {
        return Ok(None);
    };
    let label = format!("Password for {}: ", username);
    let Some(password) = ask(|l| editor.readline(l), &label)? else {
        return Ok(None);
    };
    Ok(Some(Credentials { username, password }))
}

fn ask<F>(read: F, label: &str) -> io::Result<Option<String>>
where
    F: FnOnce(&str) -> Result<String, ReadlineError>,
{
    match read(label) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(ReadlineError::Io(e)) => Err(e),
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
    }
}
