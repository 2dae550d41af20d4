//! `list` and `search <pattern>`: read-only catalog queries.

use std::io::Write;

use secfuzz_core::module::Module;

use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandList;

impl Command for CommandList {
    fn name(&self) -> &'static str {
        "list"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ls"]
    }

    fn description(&self) -> &'static str {
        "Lists all loaded modules"
    }

    fn run(&self, _args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let modules: Vec<&Module> = env.modules.modules().collect();
        if modules.is_empty() {
            tracing::warn!("No modules loaded");
            return Ok(());
        }
        let text = render_modules(&modules);
        env.out.write_all(text.as_bytes())?;
        Ok(())
    }
}

pub struct CommandSearch;

impl Command for CommandSearch {
    fn name(&self) -> &'static str {
        "search"
    }

    fn description(&self) -> &'static str {
        "Finds modules whose name, description or tags contain a pattern"
    }

    fn usage(&self) -> &'static str {
        "<pattern>"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn run(&self, args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let pattern = args.join(" ");
        let hits = env.modules.search(&pattern);
        if hits.is_empty() {
            tracing::info!("No modules matching '{}'", pattern);
            return Ok(());
        }
        let text = render_modules(&hits);
        env.out.write_all(text.as_bytes())?;
        Ok(())
    }
}

pub(crate) fn render_modules(modules: &[&Module]) -> String {
    let width = modules
        .iter()
        .map(|m| m.qualified_name().chars().count())
        .max()
        .unwrap_or(0);
    let mut s = String::new();
    for m in modules {
        if m.description().is_empty() {
            s.push_str(&format!("  {}\n", m.qualified_name()));
        } else {
            s.push_str(&format!(
                "  {:<width$}  {}\n",
                m.qualified_name(),
                m.description(),
                width = width
            ));
        }
    }
    s
}
