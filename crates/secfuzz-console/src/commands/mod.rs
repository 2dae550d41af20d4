//! Built-in console commands.
//!
//! Adding a command: implement [`Command`](crate::Command) in its own file
//! and register it in [`builtin_registry`].

mod back;
mod exit;
mod help;
mod list;
mod options;
mod run;
mod set;
mod use_module;

pub use back::CommandBack;
pub use exit::CommandExit;
pub use help::CommandHelp;
pub use list::{CommandList, CommandSearch};
pub use options::CommandOptions;
pub use run::{drain_output, render_item, CommandRun, DrainedOutput};
pub use set::{CommandSet, CommandUnset};
pub use use_module::CommandUse;

use crate::registry::{CommandRegistry, RegistryError};

/// Registry with every built-in command.
pub fn builtin_registry() -> Result<CommandRegistry, RegistryError> {
    let mut reg = CommandRegistry::new();
    reg.register(CommandSet)?;
    reg.register(CommandUnset)?;
    reg.register(CommandUse)?;
    reg.register(CommandRun)?;
    reg.register(CommandList)?;
    reg.register(CommandBack)?;
    reg.register(CommandSearch)?;
    reg.register(CommandOptions)?;
    reg.register(CommandHelp)?;
    reg.register(CommandExit)?;
    Ok(reg)
}
