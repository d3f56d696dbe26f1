use std::sync::Arc;

use consoleport_types::{BufferedOutput, CommandDefinition, ParameterMap, RuntimeOutcome};
use indexmap::IndexMap;

/// Registered command definitions keyed by identifier.
pub type CommandMap = IndexMap<String, Arc<CommandDefinition>>;

/// The runtime that owns command definitions and executes them.
///
/// Implementations may spawn processes, call into an embedded interpreter, or
/// echo parameters for previews. The bridge only reads `all()` and calls
/// `call()` synchronously, once per run.
pub trait CommandRuntime: Send + Sync {
    /// Every registered command. Treated as static for the runtime's lifetime.
    fn all(&self) -> &CommandMap;

    /// Execute `name` with translated `parameters`, writing textual output to
    /// `output`. Returns the command's status code, or the failure it raised.
    fn call(&self, name: &str, parameters: &ParameterMap, output: &mut BufferedOutput) -> RuntimeOutcome;
}
