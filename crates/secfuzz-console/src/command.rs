//! The console command contract.

use std::io::Write;

use secfuzz_core::module::{Module, ModuleContext};

use crate::error::CommandError;
use crate::interrupt::InterruptFlag;
use crate::registry::CommandRegistry;

/// A named console action. Implementations are stateless; everything they
/// read or change is reached through [`CommandEnv`].
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn description(&self) -> &'static str;

    /// Argument synopsis shown by `help <command>`.
    fn usage(&self) -> &'static str {
        ""
    }

    /// Fewer arguments than this and the command is not invoked.
    fn min_args(&self) -> usize {
        0
    }

    fn run(&self, args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError>;
}

/// What a command may touch while it runs.
pub struct CommandEnv<'a> {
    pub modules: &'a mut ModuleContext,
    pub commands: &'a CommandRegistry,
    pub interrupt: &'a InterruptFlag,
    pub out: &'a mut dyn Write,
    exit_requested: bool,
}

impl<'a> CommandEnv<'a> {
    pub fn new(
        modules: &'a mut ModuleContext,
        commands: &'a CommandRegistry,
        interrupt: &'a InterruptFlag,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            modules,
            commands,
            interrupt,
            out,
            exit_requested: false,
        }
    }

    /// The current module, or `NoModuleSelected`.
    pub fn current(&self) -> Result<&Module, CommandError> {
        self.modules.current().ok_or(CommandError::NoModuleSelected)
    }

    pub fn current_mut(&mut self) -> Result<&mut Module, CommandError> {
        self.modules.current_mut().ok_or(CommandError::NoModuleSelected)
    }

    /// Ask the session to terminate after this command.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}
