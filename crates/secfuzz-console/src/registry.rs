//! Command registry: names and aliases → commands.
//!
//! Registration happens once at startup. A name or alias that is already
//! taken rejects the whole command; nothing is inserted.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::command::Command;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Command '{0}' already registered")]
    Duplicate(String),
}

#[derive(Default)]
pub struct CommandRegistry {
    /// Registration order, one entry per command.
    commands: Vec<Arc<dyn Command>>,
    /// Name or alias → index into `commands`.
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `cmd` under its name and aliases. All keys are checked first.
    pub fn register<C: Command + 'static>(&mut self, cmd: C) -> Result<(), RegistryError> {
        let keys: Vec<&'static str> = std::iter::once(cmd.name())
            .chain(cmd.aliases().iter().copied())
            .collect();
        for (i, key) in keys.iter().enumerate() {
            if self.index.contains_key(*key) || keys[..i].contains(key) {
                return Err(RegistryError::Duplicate(key.to_string()));
            }
        }

        let slot = self.commands.len();
        self.commands.push(Arc::new(cmd));
        for key in keys {
            self.index.insert(key.to_string(), slot);
        }
        Ok(())
    }

    /// Look up a command by exact name or alias.
    pub fn resolve(&self, token: &str) -> Option<Arc<dyn Command>> {
        self.index.get(token).map(|&i| self.commands[i].clone())
    }

    /// Each command once, in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    /// Number of names and aliases.
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
