//! Execution parameters, output capture and the uniform execution result.

use std::io::{self, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status reported when a runtime failure carries no status code of its own.
pub const SERVER_ERROR_STATUS: i32 = 500;

/// Parameter key forced onto every invocation to disable colored output.
pub const NO_ANSI_FLAG: &str = "--no-ansi";

/// Translated invocation parameters.
///
/// Positional arguments keep their bare names in declaration order; options
/// are keyed with a `--` prefix.
pub type ParameterMap = IndexMap<String, Value>;

/// Failure raised by a command runtime while executing a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    /// Status code carried by the failure, if any.
    pub code: Option<i32>,
    pub message: String,
}

impl RuntimeError {
    /// Failure without a status code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Failure carrying an explicit status code.
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// The carried code, or [`SERVER_ERROR_STATUS`].
    pub fn status(&self) -> i32 {
        self.code.unwrap_or(SERVER_ERROR_STATUS)
    }
}

/// What a runtime reports back: an exit status, or a failure.
pub type RuntimeOutcome = Result<i32, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

/// In-memory sink a runtime writes command output into.
///
/// One buffer is created per invocation and consumed by [`BufferedOutput::fetch`];
/// buffers are never shared between calls.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    buffer: Vec<u8>,
    verbosity: Verbosity,
    decorated: bool,
}

impl BufferedOutput {
    pub fn new(verbosity: Verbosity, decorated: bool) -> Self {
        Self {
            buffer: Vec::new(),
            verbosity,
            decorated,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether ANSI decoration may be emitted.
    pub fn is_decorated(&self) -> bool {
        self.decorated
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the buffer, returning its contents as text.
    pub fn fetch(self) -> String {
        match String::from_utf8(self.buffer) {
            Ok(text) => text,
            Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
        }
    }
}

impl Write for BufferedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Uniform result of a command run.
///
/// A command that ran and failed has the same shape as one that succeeded;
/// only `status` and `output` differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: i32,
    pub output: String,
    pub command: String,
}

impl ExecutionResult {
    /// Collapses a runtime outcome and its captured output into a result.
    ///
    /// On failure the captured output is discarded in favour of the failure
    /// message.
    pub fn from_outcome(command: impl Into<String>, outcome: RuntimeOutcome, output: BufferedOutput) -> Self {
        let (status, output) = match outcome {
            Ok(status) => (status, output.fetch()),
            Err(error) => (error.status(), error.message),
        };
        Self {
            status,
            output,
            command: command.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_outcome_keeps_captured_output() {
        let mut output = BufferedOutput::new(Verbosity::Normal, false);
        write!(output, "Migrated: 2024_01_01_create_users").expect("write output");

        let result = ExecutionResult::from_outcome("migrate", Ok(0), output);
        assert_eq!(result.status, 0);
        assert_eq!(result.output, "Migrated: 2024_01_01_create_users");
        assert!(result.is_success());
    }

    #[test]
    fn failure_with_code_uses_code_and_message() {
        let mut output = BufferedOutput::new(Verbosity::Normal, false);
        write!(output, "partial").expect("write output");

        let result = ExecutionResult::from_outcome("backup:run", Err(RuntimeError::with_code(2, "disk full")), output);
        assert_eq!(
            result,
            ExecutionResult {
                status: 2,
                output: "disk full".into(),
                command: "backup:run".into(),
            }
        );
    }

    #[test]
    fn failure_without_code_maps_to_server_error() {
        let output = BufferedOutput::default();
        let result = ExecutionResult::from_outcome("backup:run", Err(RuntimeError::new("boom")), output);
        assert_eq!(result.status, SERVER_ERROR_STATUS);
        assert!(!result.is_success());
    }

    #[test]
    fn non_zero_status_is_passed_through() {
        let result = ExecutionResult::from_outcome("inspire", Ok(3), BufferedOutput::default());
        assert_eq!(result.status, 3);
        assert!(result.output.is_empty());
    }
}
