use std::{fmt, sync::Arc};

use consoleport_types::BridgeError;
use tracing::debug;

use crate::{CommandMap, CommandRuntime, ResolvedCommand};

/// Read-only view over the commands registered with a [`CommandRuntime`].
#[derive(Clone)]
pub struct CommandRegistry {
    runtime: Arc<dyn CommandRuntime>,
}

impl CommandRegistry {
    pub fn new(runtime: Arc<dyn CommandRuntime>) -> Self {
        Self { runtime }
    }

    /// Finds a command by identifier.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotFound`] when no command is registered under
    /// `identifier`.
    pub fn find(&self, identifier: &str) -> Result<ResolvedCommand, BridgeError> {
        self.get(identifier).ok_or_else(|| {
            debug!(command = %identifier, "command not registered");
            BridgeError::not_found(identifier)
        })
    }

    /// Like [`find`](Self::find), but `None` for unknown identifiers.
    pub fn get(&self, identifier: &str) -> Option<ResolvedCommand> {
        self.runtime.all().get(identifier).cloned().map(ResolvedCommand::new)
    }

    /// Every registered command keyed by identifier.
    pub fn list_all(&self) -> &CommandMap {
        self.runtime.all()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.runtime.all().contains_key(identifier)
    }

    pub fn runtime(&self) -> &dyn CommandRuntime {
        self.runtime.as_ref()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.runtime.all().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use consoleport_types::{ArgumentSpec, BufferedOutput, CommandDefinition, ParameterMap, RuntimeOutcome};

    use super::*;

    struct FixedRuntime {
        commands: CommandMap,
    }

    impl CommandRuntime for FixedRuntime {
        fn all(&self) -> &CommandMap {
            &self.commands
        }

        fn call(&self, _name: &str, _parameters: &ParameterMap, _output: &mut BufferedOutput) -> RuntimeOutcome {
            Ok(0)
        }
    }

    fn registry() -> CommandRegistry {
        let mut commands = CommandMap::new();
        commands.insert(
            "migrate".to_string(),
            Arc::new(CommandDefinition::new("migrate").with_argument(ArgumentSpec::required("step"))),
        );
        CommandRegistry::new(Arc::new(FixedRuntime { commands }))
    }

    #[test]
    fn find_resolves_registered_command() {
        let resolved = registry().find("migrate").expect("migrate registered");
        assert_eq!(resolved.name(), "migrate");
        assert_eq!(resolved.arguments().len(), 1);
        assert!(resolved.is_option("env"));
    }

    #[test]
    fn find_reports_not_found() {
        let err = registry().find("db:wipe").expect_err("unknown command");
        assert!(matches!(err, BridgeError::NotFound { ref identifier } if identifier == "db:wipe"));
    }

    #[test]
    fn list_all_exposes_runtime_commands() {
        let registry = registry();
        assert_eq!(registry.list_all().len(), 1);
        assert!(registry.contains("migrate"));
        assert!(registry.get("db:wipe").is_none());
    }
}
