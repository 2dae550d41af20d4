use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// secfuzz - interactive console for security testing modules
#[derive(Parser, Debug)]
#[command(name = "secfuzz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive console (default)
    Console {
        /// Module root to scan for module.yaml manifests (repeatable; overrides SECFUZZ_MODULES_DIR)
        #[arg(long = "modules-dir", value_name = "DIR")]
        modules_dir: Vec<PathBuf>,
    },

    /// Run one module non-interactively
    Run {
        /// Qualified module name, e.g. credentials/mqtt_brute
        #[arg(value_name = "MODULE")]
        module: String,

        /// Parameter assignment (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Module root to scan (repeatable)
        #[arg(long = "modules-dir", value_name = "DIR")]
        modules_dir: Vec<PathBuf>,
    },

    /// List loaded modules
    Modules {
        /// Only modules whose name, description or tags contain PATTERN
        #[arg(long, value_name = "PATTERN")]
        search: Option<String>,

        /// Module root to scan (repeatable)
        #[arg(long = "modules-dir", value_name = "DIR")]
        modules_dir: Vec<PathBuf>,
    },

    /// Package repository commands
    Pm {
        #[command(subcommand)]
        action: PmAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PmAction {
    /// Log in to a package repository
    Login {
        /// Repository URL (default: SECFUZZ_REPOSITORY or the last one used)
        #[arg(long, value_name = "URL")]
        repository: Option<String>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("target=10.0.0.1").unwrap(),
            ("target".to_string(), "10.0.0.1".to_string())
        );
        assert_eq!(
            parse_assignment("banner=a=b").unwrap(),
            ("banner".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("novalue").is_err());
    }

    #[test]
    fn test_no_subcommand_means_console() {
        let cli = Cli::try_parse_from(["secfuzz"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_collects_assignments() {
        let cli = Cli::try_parse_from([
            "secfuzz", "run", "mqtt/echo", "--set", "target=1.2.3.4", "--set", "port=8883",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run { module, set, .. }) => {
                assert_eq!(module, "mqtt/echo");
                assert_eq!(set.len(), 2);
                assert_eq!(set[1], ("port".to_string(), "8883".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
