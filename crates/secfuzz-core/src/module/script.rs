//! Script-backed modules: the entry point runs as a child process.
//!
//! Parameter values go to the child's stdin as one JSON object. Each stdout
//! line becomes one output item, pulled lazily; lines that parse as JSON are
//! kept as JSON, anything else as a string. Bytes that are not UTF-8 are
//! replaced rather than ending the run. A non-zero exit is reported as a
//! single trailing error after the lines that were produced.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use serde_json::Value;

use super::{Item, ModuleRunner, OutputStream, ParameterStore};
use crate::error::ModuleExecutionError;

/// Lines of stderr kept for the exit-status error.
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    module_dir: PathBuf,
    entry_point: PathBuf,
    interpreter: Option<String>,
}

impl ScriptRunner {
    /// `entry_point` is relative to `module_dir`. Without an explicit
    /// interpreter one is picked from the file extension.
    pub fn new(module_dir: &Path, entry_point: &str, interpreter: Option<String>) -> Self {
        let interpreter = interpreter.or_else(|| detect_interpreter(entry_point).map(String::from));
        Self {
            module_dir: module_dir.to_path_buf(),
            entry_point: module_dir.join(entry_point),
            interpreter,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = match self.interpreter {
            Some(ref interp) => {
                let mut parts = interp.split_whitespace();
                let mut c = Command::new(parts.next().unwrap_or(interp));
                c.args(parts);
                c.arg(&self.entry_point);
                c
            }
            None => Command::new(&self.entry_point),
        };
        cmd.current_dir(&self.module_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Interpreter for an entry point, by extension.
fn detect_interpreter(entry_point: &str) -> Option<&'static str> {
    if entry_point.ends_with(".py") {
        Some("python3")
    } else if entry_point.ends_with(".js") {
        Some("node")
    } else if entry_point.ends_with(".sh") {
        Some("bash")
    } else {
        None
    }
}

impl ModuleRunner for ScriptRunner {
    fn run(&self, module: &str, params: &ParameterStore) -> Result<OutputStream, ModuleExecutionError> {
        let start_err = |reason: String| ModuleExecutionError::Start {
            module: module.to_string(),
            reason,
        };

        let mut child = self
            .command()
            .spawn()
            .map_err(|e| start_err(format!("{}: {}", self.entry_point.display(), e)))?;

        let input = Value::Object(params.values()).to_string();
        if let Some(mut stdin) = child.stdin.take() {
            // The child may exit without reading its input.
            let _ = stdin.write_all(input.as_bytes());
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| start_err("stdout not captured".to_string()))?;
        let stderr = child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        tracing::debug!(module, entry_point = %self.entry_point.display(), "Started script module");

        Ok(Box::new(ScriptOutput {
            module: module.to_string(),
            child,
            stdout: BufReader::new(stdout),
            stderr,
            done: false,
        }))
    }
}

struct ScriptOutput {
    module: String,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr: Option<JoinHandle<String>>,
    done: bool,
}

impl ScriptOutput {
    fn finish(&mut self) -> Option<Result<Item, ModuleExecutionError>> {
        self.done = true;
        let status = match self.child.wait() {
            Ok(s) => s,
            Err(source) => {
                return Some(Err(ModuleExecutionError::Io {
                    module: self.module.clone(),
                    source,
                }))
            }
        };
        if status.success() {
            return None;
        }
        let stderr = self
            .stderr
            .take()
            .and_then(|h| h.join().ok())
            .map(|s| stderr_tail(&s))
            .unwrap_or_default();
        Some(Err(ModuleExecutionError::ExitStatus {
            module: self.module.clone(),
            status: status.code().unwrap_or(-1),
            stderr,
        }))
    }
}

impl Iterator for ScriptOutput {
    type Item = Result<Item, ModuleExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.stdout.read_until(b'\n', &mut buf) {
                Ok(0) => return self.finish(),
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok(parse_line(&line)));
                }
                Err(source) => {
                    self.done = true;
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    return Some(Err(ModuleExecutionError::Io {
                        module: self.module.clone(),
                        source,
                    }));
                }
            }
        }
    }
}

impl Drop for ScriptOutput {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn parse_line(line: &str) -> Item {
    let trimmed = line.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
            return v;
        }
    }
    Value::String(line.trim_end().to_string())
}

fn stderr_tail(stderr: &str) -> String {
    let mut tail: VecDeque<&str> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.trim_end());
    }
    tail.into_iter().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Parameter, ParameterKind};
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_parse_line_json_and_text() {
        assert_eq!(parse_line(r#"{"open": 22}"#), json!({"open": 22}));
        assert_eq!(parse_line("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_line("{not json"), json!("{not json"));
        assert_eq!(parse_line("plain text  "), json!("plain text"));
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let s = (1..=8).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        assert_eq!(stderr_tail(&s), "line 4\nline 5\nline 6\nline 7\nline 8");
        assert_eq!(stderr_tail(""), "");
    }

    #[test]
    fn test_detect_interpreter() {
        assert_eq!(detect_interpreter("main.py"), Some("python3"));
        assert_eq!(detect_interpreter("run.sh"), Some("bash"));
        assert_eq!(detect_interpreter("bin/tool"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_script_output_then_failure() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("main.sh"),
            "read input\necho \"$input\"\necho a\necho '{\"b\": 1}'\necho boom >&2\nexit 3\n",
        )
        .unwrap();
        let runner = ScriptRunner::new(tmp.path(), "main.sh", None);
        let mut params = ParameterStore::new();
        params
            .declare(Parameter::new("target", ParameterKind::String))
            .unwrap();
        params.set("target", "t").unwrap();

        let results: Vec<_> = runner.run("test/script", &params).unwrap().collect();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap(), &json!({"target": "t"}));
        assert_eq!(results[1].as_ref().unwrap(), &json!("a"));
        assert_eq!(results[2].as_ref().unwrap(), &json!({"b": 1}));
        match &results[3] {
            Err(ModuleExecutionError::ExitStatus { status, stderr, .. }) => {
                assert_eq!(*status, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_utf8_line_is_replaced() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("main.sh"), "printf 'ok\\n\\377\\376 bin\\nlast\\n'\n").unwrap();
        let runner = ScriptRunner::new(tmp.path(), "main.sh", None);
        let results: Vec<_> = runner
            .run("test/binary", &ParameterStore::new())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            results,
            vec![json!("ok"), json!("\u{FFFD}\u{FFFD} bin"), json!("last")]
        );
    }

    #[test]
    fn test_missing_entry_point_fails_to_start() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = ScriptRunner::new(tmp.path(), "does-not-exist", None);
        let err = runner.run("x/y", &ParameterStore::new()).err().unwrap();
        assert!(matches!(err, ModuleExecutionError::Start { .. }));
    }
}
