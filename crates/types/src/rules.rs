//! Validation rule tokens derived from command metadata.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single rule applied to an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleToken {
    Required,
    Nullable,
    Array,
    String,
    Bool,
}

impl RuleToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Nullable => "nullable",
            Self::Array => "array",
            Self::String => "string",
            Self::Bool => "bool",
        }
    }

    /// Whether this token is a presence token (`required` or `nullable`).
    pub fn is_presence(&self) -> bool {
        matches!(self, Self::Required | Self::Nullable)
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to its ordered rule tokens.
///
/// Field names are the raw argument/option names; flag prefixes are never
/// applied here. Insertion order is preserved (arguments first, then options).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationRuleSet {
    rules: IndexMap<String, Vec<RuleToken>>,
}

impl ValidationRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rules for `field`, replacing any previous entry in place.
    pub fn insert(&mut self, field: impl Into<String>, tokens: Vec<RuleToken>) {
        self.rules.insert(field.into(), tokens);
    }

    pub fn get(&self, field: &str) -> Option<&[RuleToken]> {
        self.rules.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.rules.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleToken])> {
        self.rules.iter().map(|(field, tokens)| (field.as_str(), tokens.as_slice()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
