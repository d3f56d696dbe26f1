//! Client-facing projections of command definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder error reported for identifiers that no longer resolve.
pub const NOT_FOUND_ERROR: &str = "Not found";

/// Display-ready description of a positional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    pub title: String,
    pub name: String,
    pub description: String,
    /// `None` when the declared default is absent or empty.
    pub default: Option<Value>,
    pub required: bool,
    pub array: bool,
}

/// Display-ready description of an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    pub title: String,
    pub name: String,
    pub description: String,
    pub shortcut: Option<String>,
    /// Mirrors `value_required`.
    pub required: bool,
    pub array: bool,
    pub accept_value: bool,
    pub default: Option<Value>,
}

/// Full schema of a single command.
///
/// `arguments` and `options` serialize as `null` (not `[]`) when the command
/// declares none; rendering clients treat that as "not applicable".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    pub synopsis: String,
    pub arguments: Option<Vec<ArgumentSchema>>,
    pub options: Option<Vec<OptionSchema>>,
}

/// Stand-in for a configured identifier the registry does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCommand {
    pub name: String,
    pub error: String,
}

impl MissingCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: NOT_FOUND_ERROR.to_string(),
        }
    }
}

/// One entry of a listed group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandListing {
    Command(CommandSchema),
    Missing(MissingCommand),
}

impl CommandListing {
    pub fn name(&self) -> &str {
        match self {
            Self::Command(schema) => &schema.name,
            Self::Missing(missing) => &missing.name,
        }
    }

    pub fn as_schema(&self) -> Option<&CommandSchema> {
        match self {
            Self::Command(schema) => Some(schema),
            Self::Missing(_) => None,
        }
    }
}

/// Title-cased group name to the listings it contains.
pub type GroupedListing = IndexMap<String, Vec<CommandListing>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_inputs_serialize_as_null() {
        let schema = CommandSchema {
            name: "about".into(),
            description: String::new(),
            synopsis: "about".into(),
            arguments: None,
            options: None,
        };
        let value = serde_json::to_value(&schema).expect("serialize schema");
        assert!(value["arguments"].is_null());
        assert!(value["options"].is_null());
    }

    #[test]
    fn missing_listing_serializes_flat() {
        let listing = CommandListing::Missing(MissingCommand::new("stale:command"));
        let value = serde_json::to_value(&listing).expect("serialize listing");
        assert_eq!(value, serde_json::json!({ "name": "stale:command", "error": "Not found" }));
        assert_eq!(listing.name(), "stale:command");
        assert!(listing.as_schema().is_none());
    }
}
