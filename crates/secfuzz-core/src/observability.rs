//! Tracing initialization.
//!
//! Uses `config::ObservabilityConfig` for SECFUZZ_QUIET, SECFUZZ_LOG_LEVEL
//! and SECFUZZ_LOG_JSON. `RUST_LOG` wins over all of them.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Tracing initialization mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingMode {
    /// One-shot CLI commands: targets shown.
    Default,
    /// Interactive console: no targets.
    Console,
}

/// Initialize tracing. Call once at process startup; later calls are no-ops.
pub fn init_tracing(mode: TracingMode) {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "secfuzz=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let with_target = matches!(mode, TracingMode::Default);

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(with_target)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}
