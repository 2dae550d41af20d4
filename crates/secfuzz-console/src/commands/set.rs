//! `set <name> <value>` and `unset <name>` on the current module.

use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandSet;

impl Command for CommandSet {
    fn name(&self) -> &'static str {
        "set"
    }

    fn description(&self) -> &'static str {
        "Sets a parameter of the current module"
    }

    fn usage(&self) -> &'static str {
        "<name> <value...>"
    }

    fn min_args(&self) -> usize {
        2
    }

    fn run(&self, args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let name = &args[0];
        // Values may contain spaces; the tokenizer split them.
        let value = args[1..].join(" ");
        let module = env.current_mut()?;
        module.parameters_mut().set(name, &value)?;
        tracing::info!("{} => {}", name, value);
        Ok(())
    }
}

pub struct CommandUnset;

impl Command for CommandUnset {
    fn name(&self) -> &'static str {
        "unset"
    }

    fn description(&self) -> &'static str {
        "Resets a parameter of the current module to its default"
    }

    fn usage(&self) -> &'static str {
        "<name>"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn run(&self, args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let module = env.current_mut()?;
        module.parameters_mut().unset(&args[0])?;
        Ok(())
    }
}
