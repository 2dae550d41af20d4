use std::io::Write;

use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandHelp;

impl Command for CommandHelp {
    fn name(&self) -> &'static str {
        "help"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["?"]
    }

    fn description(&self) -> &'static str {
        "Shows available commands, or usage of one command"
    }

    fn usage(&self) -> &'static str {
        "[command]"
    }

    fn run(&self, args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let text = match args.first() {
            Some(name) => match env.commands.resolve(name) {
                Some(cmd) => describe(cmd.as_ref()),
                None => {
                    tracing::warn!("No command named \"{}\"", name);
                    return Ok(());
                }
            },
            None => overview(env),
        };
        env.out.write_all(text.as_bytes())?;
        Ok(())
    }
}

fn overview(env: &CommandEnv<'_>) -> String {
    let rows: Vec<(String, &str)> = env
        .commands
        .commands()
        .map(|c| {
            let mut label = c.name().to_string();
            if !c.aliases().is_empty() {
                label.push_str(&format!(" ({})", c.aliases().join(", ")));
            }
            (label, c.description())
        })
        .collect();
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let mut s = String::from("\nCommands:\n\n");
    for (label, desc) in rows {
        s.push_str(&format!("  {:<width$}  {}\n", label, desc, width = width));
    }
    s.push('\n');
    s
}

fn describe(cmd: &dyn Command) -> String {
    let mut s = format!("\n  {} {}\n\n  {}\n", cmd.name(), cmd.usage(), cmd.description());
    if !cmd.aliases().is_empty() {
        s.push_str(&format!("  Aliases: {}\n", cmd.aliases().join(", ")));
    }
    s.push('\n');
    s
}
