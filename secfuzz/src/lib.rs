//! secfuzz CLI library: argument parsing and top-level dispatch.

mod cli;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, PmAction};
use secfuzz_console::commands::builtin_registry;
use secfuzz_console::{ConsoleSession, Dispatch, EditorReader, InterruptFlag};
use secfuzz_core::config::PathsConfig;
use secfuzz_core::module::{ManifestLoader, ModuleContext, ModuleLoader};
use secfuzz_core::observability::{init_tracing, TracingMode};
use secfuzz_pm::{ConfigStore, HttpAuthenticator};

/// Parse args and dispatch to the selected subcommand.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Console { .. }));
    init_tracing(if interactive {
        TracingMode::Console
    } else {
        TracingMode::Default
    });

    match cli.command {
        None => run_console(Vec::new()),
        Some(Commands::Console { modules_dir }) => run_console(modules_dir),
        Some(Commands::Run {
            module,
            set,
            modules_dir,
        }) => {
            let mut session = open_session(modules_dir)?;
            let mut out = io::stdout().lock();
            run_module(&mut session, &module, &set, &mut out)
        }
        Some(Commands::Modules {
            search,
            modules_dir,
        }) => {
            let mut session = open_session(modules_dir)?;
            let mut out = io::stdout().lock();
            match search {
                Some(pattern) => expect_completed(&mut session, "search", &[pattern], &mut out),
                None => expect_completed(&mut session, "list", &[], &mut out),
            }
        }
        Some(Commands::Pm {
            action: PmAction::Login { repository },
        }) => pm_login(repository),
    }
}

fn load_context(modules_dir: Vec<PathBuf>) -> Result<ModuleContext> {
    let paths = PathsConfig::from_env().with_module_dirs(modules_dir);
    tracing::debug!("Module roots: {:?}", paths.module_dirs);
    let modules = ManifestLoader::new(paths.module_dirs)
        .load_modules()
        .context("Unable to load modules")?;
    let context = ModuleContext::new(modules).context("Unable to load modules")?;
    tracing::info!("Loaded {} module(s)", context.len());
    Ok(context)
}

/// Load modules, register commands and hook Ctrl+C to the session.
fn open_session(modules_dir: Vec<PathBuf>) -> Result<ConsoleSession> {
    let context = load_context(modules_dir)?;
    let registry = builtin_registry().context("Failed to register console commands")?;
    let interrupt = InterruptFlag::new();
    interrupt.install_ctrlc_handler()?;
    Ok(ConsoleSession::new(registry, context).with_interrupt(interrupt))
}

fn run_console(modules_dir: Vec<PathBuf>) -> Result<()> {
    let mut session = open_session(modules_dir)?;
    let mut reader = EditorReader::new()?;
    let mut out = io::stdout().lock();
    session.run(&mut reader, &mut out);
    Ok(())
}

/// `use`, `set` for each assignment, then `run`; stops at the first step
/// that does not complete. Values reach the module exactly as given.
fn run_module(
    session: &mut ConsoleSession,
    module: &str,
    assignments: &[(String, String)],
    out: &mut dyn Write,
) -> Result<()> {
    expect_completed(session, "use", &[module.to_string()], out)?;
    for (name, value) in assignments {
        expect_completed(session, "set", &[name.clone(), value.clone()], out)?;
    }
    expect_completed(session, "run", &[], out)
}

fn expect_completed(
    session: &mut ConsoleSession,
    command: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let step = std::iter::once(command)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    match session.dispatch(command, args, out) {
        Dispatch::Completed => Ok(()),
        Dispatch::Failed(kind) => anyhow::bail!("`{}` failed ({:?})", step, kind),
        other => anyhow::bail!("`{}` did not complete: {:?}", step, other),
    }
}

fn pm_login(repository: Option<String>) -> Result<()> {
    let paths = PathsConfig::from_env();
    let store = ConfigStore::in_home(&paths.home);
    let saved = store.load()?;
    let repository = repository
        .or(saved.repository)
        .unwrap_or(paths.repository);

    tracing::info!("Logging in to {}", repository);
    let Some(credentials) = secfuzz_pm::prompt_credentials()? else {
        tracing::warn!("Cancelled by user");
        return Ok(());
    };
    secfuzz_pm::login(&HttpAuthenticator::default(), &store, &repository, &credentials)
        .context("Unable to login")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_module(root: &Path, name: &str, manifest: &str, script: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("module.yaml"), manifest).unwrap();
        fs::write(dir.join("main.sh"), script).unwrap();
    }

    fn session_for(root: &Path) -> ConsoleSession {
        let context = load_context(vec![root.to_path_buf()]).unwrap();
        ConsoleSession::new(builtin_registry().unwrap(), context)
    }

    #[cfg(unix)]
    #[test]
    fn test_run_module_one_shot() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "net/echo",
            "description: echo input\nentry_point: main.sh\nparameters:\n  - name: target\n    type: host\n    required: true\n",
            "read input\necho \"$input\"\necho done\n",
        );
        let mut session = session_for(tmp.path());
        let mut out = Vec::new();
        run_module(
            &mut session,
            "net/echo",
            &[("target".to_string(), "10.0.0.1".to_string())],
            &mut out,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"target\":\"10.0.0.1\"}\ndone\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_module_reports_failure() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "net/broken",
            "entry_point: main.sh\n",
            "echo partial\nexit 2\n",
        );
        let mut session = session_for(tmp.path());
        let mut out = Vec::new();
        let err = run_module(&mut session, "net/broken", &[], &mut out).unwrap_err();
        assert!(err.to_string().contains("`run` failed"));
        assert_eq!(String::from_utf8(out).unwrap(), "partial\n");
    }

    #[test]
    fn test_run_module_stops_at_bad_assignment() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "net/echo",
            "entry_point: main.sh\nparameters:\n  - name: port\n    type: port\n",
            "exit 0\n",
        );
        let mut session = session_for(tmp.path());
        let mut out = Vec::new();
        let err = run_module(
            &mut session,
            "net/echo",
            &[("port".to_string(), "99999".to_string())],
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("set port 99999"));
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_module_passes_values_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "net/banner",
            "entry_point: main.sh\nparameters:\n  - name: banner\n    type: string\n",
            "read input\necho \"$input\"\n",
        );
        let mut session = session_for(tmp.path());
        for (value, expected) in [
            ("  a  b ", "{\"banner\":\"  a  b \"}\n"),
            ("", "{\"banner\":\"\"}\n"),
        ] {
            let mut out = Vec::new();
            run_module(
                &mut session,
                "net/banner",
                &[("banner".to_string(), value.to_string())],
                &mut out,
            )
            .unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), expected);
        }
    }

    #[test]
    fn test_unknown_module() {
        let tmp = tempfile::tempdir().unwrap();
        let mut session = session_for(tmp.path());
        let mut out = Vec::new();
        assert!(run_module(&mut session, "nope", &[], &mut out).is_err());
    }
}
