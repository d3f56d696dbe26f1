//! Operation-level failures surfaced by the bridge.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field name to the messages describing why it was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The first message recorded, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().flatten().next().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for messages in self.0.values() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                f.write_str(message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Failures that abort a list/run operation before any execution happens.
///
/// Runtime failures are not represented here; they are absorbed into an
/// [`ExecutionResult`](crate::ExecutionResult).
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("command not found: {identifier}")]
    NotFound { identifier: String },

    #[error("command '{identifier}' requires permission '{permission}'")]
    Forbidden { identifier: String, permission: String },

    #[error("invalid input for '{identifier}': {errors}")]
    Validation { identifier: String, errors: ValidationErrors },
}

impl BridgeError {
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
        }
    }

    pub fn forbidden(identifier: impl Into<String>, permission: impl Into<String>) -> Self {
        Self::Forbidden {
            identifier: identifier.into(),
            permission: permission.into(),
        }
    }

    pub fn validation(identifier: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            identifier: identifier.into(),
            errors,
        }
    }

    /// Standard HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Forbidden { .. } => 403,
            Self::Validation { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_creation() {
        let err = BridgeError::not_found("migrate");
        assert!(matches!(err, BridgeError::NotFound { .. }));
        assert_eq!(err.status_code(), 404);

        let err = BridgeError::forbidden("migrate", "run-migrations");
        assert!(matches!(err, BridgeError::Forbidden { .. }));
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "command 'migrate' requires permission 'run-migrations'");
    }

    #[test]
    fn validation_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("step", "The step field is required.");
        errors.add("seeders", "The seeders field must be an array.");
        errors.add("step", "second");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("step").map(<[String]>::len), Some(2));
        assert_eq!(errors.first_message(), Some("The step field is required."));

        let err = BridgeError::validation("migrate", errors);
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().starts_with("invalid input for 'migrate': The step field is required.;"));
    }
}
