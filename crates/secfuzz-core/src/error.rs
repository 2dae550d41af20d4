//! Error types shared by modules, the loader and the console.

use std::path::PathBuf;
use thiserror::Error;

/// A `set`/`run` precondition failure: bad value, unknown or missing parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterValidationError {
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Required parameter '{0}' is not set")]
    MissingRequired(String),
}

/// Failure raised by a module's own run logic, before or while producing output.
#[derive(Debug, Error)]
pub enum ModuleExecutionError {
    #[error("Module '{module}' failed to start: {reason}")]
    Start { module: String, reason: String },

    #[error("Module '{module}' failed: {reason}")]
    Failed { module: String, reason: String },

    #[error("Module '{module}' exited with status {status}{}", stderr_suffix(.stderr))]
    ExitStatus {
        module: String,
        status: i32,
        stderr: String,
    },

    #[error("Module '{module}' output error: {source}")]
    Io {
        module: String,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl ModuleExecutionError {
    /// Shorthand for module authors signalling an expected failure.
    pub fn failed(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

/// Module discovery failure. Aborts the console at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read module root {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid module manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid module manifest {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("Module '{0}' is defined more than once")]
    DuplicateModule(String),
}

/// `use <token>` matched nothing, or more than one module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Module '{0}' not found")]
    NotFound(String),

    #[error("Module '{token}' is ambiguous; candidates: {}", .candidates.join(", "))]
    Ambiguous {
        token: String,
        candidates: Vec<String>,
    },
}
