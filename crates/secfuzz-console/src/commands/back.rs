use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandBack;

impl Command for CommandBack {
    fn name(&self) -> &'static str {
        "back"
    }

    fn description(&self) -> &'static str {
        "Deselects the current module"
    }

    fn run(&self, _args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        env.modules.clear();
        Ok(())
    }
}
