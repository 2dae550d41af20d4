//! Environment variable keys and aliases.
//!
//! Primary keys use the `SECFUZZ_*` prefix; the `ISF_*` names are still read
//! for installs that predate the rename.

/// Logging and output.
pub mod observability {
    pub const SECFUZZ_QUIET: &str = "SECFUZZ_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["ISF_QUIET"];

    pub const SECFUZZ_LOG_LEVEL: &str = "SECFUZZ_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["ISF_LOG_LEVEL"];

    pub const SECFUZZ_LOG_JSON: &str = "SECFUZZ_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &["ISF_LOG_JSON"];
}

/// Home, module roots and package repository.
pub mod paths {
    pub const SECFUZZ_HOME: &str = "SECFUZZ_HOME";
    pub const HOME_ALIASES: &[&str] = &["ISF_HOME"];

    /// `:`-separated list of module roots.
    pub const SECFUZZ_MODULES_DIR: &str = "SECFUZZ_MODULES_DIR";
    pub const MODULES_DIR_ALIASES: &[&str] = &["ISF_MODULES_DIR"];

    pub const SECFUZZ_REPOSITORY: &str = "SECFUZZ_REPOSITORY";
    pub const REPOSITORY_ALIASES: &[&str] = &["ISFPM_REPOSITORY"];
}
