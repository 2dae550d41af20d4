//! Interactive console: command registry, navigation commands and the REPL.

pub mod command;
pub mod commands;
pub mod error;
pub mod interrupt;
pub mod registry;
pub mod session;

pub use command::{Command, CommandEnv};
pub use error::{CommandError, ErrorKind};
pub use interrupt::InterruptFlag;
pub use registry::{CommandRegistry, RegistryError};
pub use session::{ConsoleSession, Dispatch, EditorReader, LineReader, ReadOutcome, SessionState};
