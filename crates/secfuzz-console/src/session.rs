//! ConsoleSession: the read and dispatch loop.
//!
//! One line per iteration: blank lines are skipped, the first token selects a
//! command by name or alias, the rest are its arguments. Command failures are
//! classified and logged; none of them ends the session. The session ends on
//! Ctrl+C or Ctrl+D at the prompt, on `exit`, or when the line reader itself
//! fails.

use std::io::Write;

use anyhow::Result;
use secfuzz_core::module::ModuleContext;

use crate::command::CommandEnv;
use crate::error::{report_failure, ErrorKind};
use crate::interrupt::InterruptFlag;
use crate::registry::CommandRegistry;

const PROMPT_NAME: &str = "secfuzz";

/// What the prompt returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl+C while waiting for input.
    Interrupted,
    /// Ctrl+D / end of input.
    Eof,
}

/// Line-editing front end.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    fn add_history(&mut self, _line: &str) {}
}

/// rustyline-backed reader for interactive terminals.
pub struct EditorReader {
    editor: rustyline::DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        let editor = rustyline::DefaultEditor::new()
            .map_err(|e| anyhow::anyhow!("Failed to create line editor: {}", e))?;
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(rustyline::error::ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(rustyline::error::ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(anyhow::anyhow!("Failed to read input: {}", e)),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated,
}

/// Result of dispatching one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank line; nothing happened.
    Empty,
    UnknownCommand(String),
    TooFewArgs { command: String, required: usize },
    Completed,
    Failed(ErrorKind),
    /// The command asked to leave the console.
    Exit,
}

pub struct ConsoleSession {
    registry: CommandRegistry,
    context: ModuleContext,
    interrupt: InterruptFlag,
    state: SessionState,
}

impl ConsoleSession {
    pub fn new(registry: CommandRegistry, context: ModuleContext) -> Self {
        Self {
            registry,
            context,
            interrupt: InterruptFlag::new(),
            state: SessionState::Running,
        }
    }

    /// Share an interrupt flag, e.g. one wired to Ctrl+C.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `secfuzz > `, or `secfuzz (<module>) > ` while a module is selected.
    pub fn prompt(&self) -> String {
        match self.context.current() {
            Some(m) => format!("{} ({}) > ", PROMPT_NAME, m.qualified_name()),
            None => format!("{} > ", PROMPT_NAME),
        }
    }

    /// Tokenize, resolve and run one input line.
    pub fn dispatch_line(&mut self, line: &str, out: &mut dyn Write) -> Dispatch {
        let mut tokens = line.split_whitespace();
        let Some(cmd_name) = tokens.next() else {
            return Dispatch::Empty;
        };
        let args: Vec<String> = tokens.map(String::from).collect();
        self.dispatch(cmd_name, &args, out)
    }

    /// Resolve and run a command with arguments that are already split.
    /// Arguments are passed through untouched, empty ones included.
    pub fn dispatch(&mut self, cmd_name: &str, args: &[String], out: &mut dyn Write) -> Dispatch {
        let Some(cmd) = self.registry.resolve(cmd_name) else {
            tracing::warn!("No command named \"{}\"", cmd_name);
            return Dispatch::UnknownCommand(cmd_name.to_string());
        };

        if args.len() < cmd.min_args() {
            tracing::warn!(
                "Invalid number of arguments; at least {} required",
                cmd.min_args()
            );
            return Dispatch::TooFewArgs {
                command: cmd.name().to_string(),
                required: cmd.min_args(),
            };
        }

        self.interrupt.clear();
        let mut env = CommandEnv::new(&mut self.context, &self.registry, &self.interrupt, out);
        let result = cmd.run(args, &mut env);
        let exit = env.exit_requested();
        self.interrupt.clear();

        match result {
            Err(e) => Dispatch::Failed(report_failure(&e)),
            Ok(()) if exit => {
                self.state = SessionState::Terminated;
                Dispatch::Exit
            }
            Ok(()) => Dispatch::Completed,
        }
    }

    /// Read and dispatch lines until the session terminates.
    pub fn run<R: LineReader>(&mut self, reader: &mut R, out: &mut dyn Write) {
        self.state = SessionState::Running;
        while self.state == SessionState::Running {
            let prompt = self.prompt();
            match reader.read_line(&prompt) {
                Ok(ReadOutcome::Line(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    reader.add_history(line.trim());
                    if self.dispatch_line(&line, out) == Dispatch::Exit {
                        tracing::info!("Bye!");
                    }
                }
                Ok(ReadOutcome::Interrupted) | Ok(ReadOutcome::Eof) => {
                    tracing::info!("Bye!");
                    self.state = SessionState::Terminated;
                }
                Err(e) => {
                    tracing::error!("Unhandled error: {:?}", e);
                    self.state = SessionState::Terminated;
                }
            }
        }
    }
}
