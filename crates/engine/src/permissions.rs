//! Permission guards keyed by command identifier.

use std::collections::HashSet;

use consoleport_registry::BridgeConfig;
use consoleport_types::BridgeError;
use indexmap::IndexMap;
use tracing::warn;

/// Evaluates a named permission against the current caller.
pub trait Gate {
    fn check(&self, permission: &str) -> bool;
}

/// Gate backed by a fixed set of granted abilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityGate {
    abilities: HashSet<String>,
}

impl AbilityGate {
    pub fn new<I, S>(abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            abilities: abilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn grant(&mut self, ability: impl Into<String>) {
        self.abilities.insert(ability.into());
    }

    pub fn abilities(&self) -> impl Iterator<Item = &str> {
        self.abilities.iter().map(String::as_str)
    }
}

impl Gate for AbilityGate {
    fn check(&self, permission: &str) -> bool {
        self.abilities.contains(permission)
    }
}

/// Which permission, if any, guards each command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPolicy {
    guards: IndexMap<String, String>,
}

impl PermissionPolicy {
    pub fn new(guards: IndexMap<String, String>) -> Self {
        Self { guards }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.permissions.clone())
    }

    pub fn guard_for(&self, identifier: &str) -> Option<&str> {
        self.guards.get(identifier).map(String::as_str)
    }

    /// Unguarded commands are always allowed.
    pub fn allows(&self, identifier: &str, gate: &dyn Gate) -> bool {
        self.guard_for(identifier).is_none_or(|permission| gate.check(permission))
    }

    /// # Errors
    ///
    /// [`BridgeError::Forbidden`] when a guard is configured and `gate`
    /// rejects it.
    pub fn authorize(&self, identifier: &str, gate: &dyn Gate) -> Result<(), BridgeError> {
        match self.guard_for(identifier) {
            Some(permission) if !gate.check(permission) => {
                warn!(command = %identifier, permission = %permission, "permission denied");
                Err(BridgeError::forbidden(identifier, permission))
            }
            _ => Ok(()),
        }
    }
}
