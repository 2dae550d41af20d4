use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandExit;

impl Command for CommandExit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["quit"]
    }

    fn description(&self) -> &'static str {
        "Leaves the console"
    }

    fn run(&self, _args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        env.request_exit();
        Ok(())
    }
}
