//! Typed configuration grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, paths as path_keys};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Package repository used when nothing else is configured.
pub const DEFAULT_REPOSITORY: &str = "http://127.0.0.1:8000";

/// Logging configuration: quiet, log_level, log_json.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::SECFUZZ_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(
                    obv_keys::SECFUZZ_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "secfuzz=info".to_string(),
                ),
                log_json: env_bool(obv_keys::SECFUZZ_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
            }
        })
    }
}

/// Home directory, module roots and package repository.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// `~/.secfuzz` unless `SECFUZZ_HOME` is set.
    pub home: PathBuf,
    /// Roots scanned for `module.yaml` manifests, in priority order.
    pub module_dirs: Vec<PathBuf>,
    pub repository: String,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let home = env_optional(path_keys::SECFUZZ_HOME, path_keys::HOME_ALIASES)
            .map(PathBuf::from)
            .unwrap_or_else(default_home);

        let module_dirs = match env_optional(
            path_keys::SECFUZZ_MODULES_DIR,
            path_keys::MODULES_DIR_ALIASES,
        ) {
            Some(raw) => split_dirs(&raw),
            None => vec![PathBuf::from("modules"), home.join("modules")],
        };

        let repository = env_or(
            path_keys::SECFUZZ_REPOSITORY,
            path_keys::REPOSITORY_ALIASES,
            || DEFAULT_REPOSITORY.to_string(),
        );

        Self {
            home,
            module_dirs,
            repository,
        }
    }

    /// Replace the module roots when the CLI supplies its own.
    #[must_use]
    pub fn with_module_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        if !dirs.is_empty() {
            self.module_dirs = dirs;
        }
        self
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".secfuzz")
}

fn split_dirs(raw: &str) -> Vec<PathBuf> {
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
