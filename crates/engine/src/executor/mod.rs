//! The execution bridge: resolve, authorize, validate, marshal, execute.

pub mod runner;

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

use consoleport_registry::{CommandRegistry, ResolvedCommand};
use consoleport_types::{
    BridgeError, BufferedOutput, ExecutionResult, NO_ANSI_FLAG, ParameterMap, RuntimeError, Verbosity, is_empty_value,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub use runner::{Invocation, NoopRuntime, ProcessRuntime};

use crate::{PermissionPolicy, ValidatedInput, derive_rules, permissions::Gate, validate_input};

/// Runs registered commands on behalf of a caller.
///
/// Holds only read-only state; every call gets its own output buffer.
#[derive(Debug, Clone)]
pub struct CommandBridge {
    registry: CommandRegistry,
    policy: PermissionPolicy,
}

impl CommandBridge {
    pub fn new(registry: CommandRegistry, policy: PermissionPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    /// Runs `identifier` with the caller-supplied `input`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotFound`] for an unregistered identifier
    /// - [`BridgeError::Forbidden`] when the caller fails the command's guard
    /// - [`BridgeError::Validation`] when `input` violates the derived rules
    ///
    /// Failures raised while the command runs are never returned as errors;
    /// they are folded into the [`ExecutionResult`].
    pub fn run(&self, identifier: &str, input: &Map<String, Value>, gate: &dyn Gate) -> Result<ExecutionResult, BridgeError> {
        let command = self.registry.find(identifier)?;
        self.policy.authorize(identifier, gate)?;

        let rules = derive_rules(&command);
        let validated = validate_input(&rules, input).map_err(|errors| {
            debug!(command = %identifier, fields = ?errors.fields().collect::<Vec<_>>(), "input rejected");
            BridgeError::validation(identifier, errors)
        })?;

        let parameters = marshal_parameters(&command, validated);
        Ok(self.execute(&command, &parameters))
    }

    /// Calls the runtime with already-marshaled parameters.
    pub fn execute(&self, command: &ResolvedCommand, parameters: &ParameterMap) -> ExecutionResult {
        let name = command.name();
        let mut output = BufferedOutput::new(Verbosity::Normal, false);
        let runtime = self.registry.runtime();

        let outcome = catch_unwind(AssertUnwindSafe(|| runtime.call(name, parameters, &mut output)))
            .unwrap_or_else(|payload| Err(RuntimeError::new(panic_message(payload.as_ref()))));

        let result = ExecutionResult::from_outcome(name, outcome, output);
        if result.is_success() {
            info!(command = %name, status = result.status, "command finished");
        } else {
            warn!(command = %name, status = result.status, "command failed");
        }
        result
    }
}

/// Translates validated fields into runtime parameters.
///
/// Empty values are dropped, option names gain a `--` prefix, argument names
/// pass through unchanged, and [`NO_ANSI_FLAG`] is always appended last.
pub fn marshal_parameters(command: &ResolvedCommand, validated: ValidatedInput) -> ParameterMap {
    let mut parameters: ParameterMap = validated
        .into_iter()
        .filter(|(_, value)| !is_empty_value(value))
        .map(|(name, value)| {
            let key = if command.is_option(&name) { format!("--{name}") } else { name };
            (key, value)
        })
        .collect();

    parameters.shift_remove(NO_ANSI_FLAG);
    parameters.insert(NO_ANSI_FLAG.to_string(), Value::Bool(true));
    parameters
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "command panicked".to_string()
    }
}
