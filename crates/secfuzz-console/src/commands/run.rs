//! `run` / `start`: execute the current module and report its output.
//!
//! The output stream is drained completely before anything is reported.
//! Items produced before a mid-stream failure are still reported, in order;
//! the failure itself surfaces afterwards as a module execution error.

use std::io::Write;

use secfuzz_core::module::{Item, OutputStream};
use serde_json::Value;

use crate::command::{Command, CommandEnv};
use crate::error::CommandError;
use crate::interrupt::InterruptFlag;

pub struct CommandRun;

impl Command for CommandRun {
    fn name(&self) -> &'static str {
        "run"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["start"]
    }

    fn description(&self) -> &'static str {
        "Executes the selected module"
    }

    fn run(&self, _args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let module = env.current()?;
        let name = module.qualified_name().to_string();
        module.parameters().check_required()?;

        tracing::info!("Running module {}", name);
        let stream = module.run()?;
        let drained = drain_output(stream, env.interrupt);

        for item in &drained.items {
            writeln!(env.out, "{}", render_item(item))?;
        }
        env.out.flush()?;
        tracing::info!("Module {} produced {} item(s)", name, drained.items.len());

        match drained.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Everything pulled from a module's output stream.
#[derive(Debug)]
pub struct DrainedOutput {
    /// Items in emission order.
    pub items: Vec<Item>,
    /// Why the stream stopped early, if it did.
    pub failure: Option<CommandError>,
}

/// Pull `stream` to the end, the first error, or a user interrupt.
///
/// The interrupt flag is checked before every pull, and again when a pull
/// ends the stream: Ctrl+C reaches the whole process group, so a child
/// process may die from the same signal that raised the flag. The stream is
/// dropped on return, which stops the module.
pub fn drain_output(mut stream: OutputStream, interrupt: &InterruptFlag) -> DrainedOutput {
    let mut items = Vec::new();
    let failure = loop {
        if interrupt.is_raised() {
            break Some(CommandError::Interrupted);
        }
        match stream.next() {
            Some(Ok(item)) => items.push(item),
            Some(Err(_)) | None if interrupt.is_raised() => break Some(CommandError::Interrupted),
            Some(Err(e)) => break Some(CommandError::Execution(e)),
            None => break None,
        }
    };
    DrainedOutput { items, failure }
}

/// Strings verbatim, other JSON compact.
pub fn render_item(item: &Item) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
