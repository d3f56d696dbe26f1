//! Command definitions as supplied by a command runtime.
//!
//! A [`CommandDefinition`] is read-only metadata: the bridge projects it into
//! client schemas, derives validation rules from it and marshals parameters
//! against it, but never mutates it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the synthetic option merged into every command's option set.
pub const ENV_OPTION_NAME: &str = "env";

/// Description attached to the synthetic `env` option.
pub const ENV_OPTION_DESCRIPTION: &str = "The environment the command should run under";

/// Static metadata describing a runnable command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Unique, stable identifier (e.g. "cache:clear").
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Explicit usage line. Rendered from arguments/options when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    /// Positional arguments in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    /// Named options in declaration order.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            synopsis: None,
            arguments: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Returns the explicit synopsis, or renders one from the declared inputs.
    pub fn synopsis(&self) -> String {
        match &self.synopsis {
            Some(synopsis) if !synopsis.trim().is_empty() => synopsis.clone(),
            _ => self.render_synopsis(),
        }
    }

    /// Renders a usage line such as `migrate [--seed] [--path[=PATH]] [--] <step>`.
    ///
    /// Only the declared inputs are rendered; options merged in later by the
    /// bridge never appear here.
    pub fn render_synopsis(&self) -> String {
        let mut elements: Vec<String> = self.options.iter().map(OptionSpec::usage_element).collect();

        if !elements.is_empty() && !self.arguments.is_empty() {
            elements.push("[--]".to_string());
        }
        elements.extend(self.arguments.iter().map(ArgumentSpec::usage_element));

        if elements.is_empty() {
            return self.name.clone();
        }
        format!("{} {}", self.name, elements.join(" "))
    }
}

/// Positional input to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Accepts multiple values.
    #[serde(default, rename = "array")]
    pub is_array: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

impl ArgumentSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: true,
            is_array: false,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn usage_element(&self) -> String {
        let mut element = format!("<{}>", self.name);
        if self.is_array {
            element.push_str("...");
        }
        if !self.required {
            element = format!("[{element}]");
        }
        element
    }
}

/// Named, flag-style input to a command.
///
/// An option that does not accept a value is a boolean flag. Array and
/// value-required options always accept a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Single-letter alias, display only.
    #[serde(default)]
    pub shortcut: Option<String>,
    #[serde(default)]
    pub accepts_value: bool,
    #[serde(default, rename = "array")]
    pub is_array: bool,
    #[serde(default)]
    pub value_required: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

impl OptionSpec {
    /// Boolean flag (no value accepted).
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            shortcut: None,
            accepts_value: false,
            is_array: false,
            value_required: false,
            default: None,
        }
    }

    /// Option whose value may be omitted.
    pub fn optional_value(name: impl Into<String>) -> Self {
        Self {
            accepts_value: true,
            ..Self::flag(name)
        }
    }

    /// Option that must be given a value.
    pub fn required_value(name: impl Into<String>) -> Self {
        Self {
            accepts_value: true,
            value_required: true,
            ..Self::flag(name)
        }
    }

    /// The synthetic `env` option: accepts an optional value, no shortcut.
    pub fn env() -> Self {
        Self::optional_value(ENV_OPTION_NAME).with_description(ENV_OPTION_DESCRIPTION)
    }

    /// Marks the option as accepting multiple values.
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self.accepts_value = true;
        self
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether the option accepts a value but does not insist on one.
    pub fn is_value_optional(&self) -> bool {
        self.accepts_value && !self.value_required
    }

    fn usage_element(&self) -> String {
        let shortcut = self
            .shortcut
            .as_deref()
            .filter(|shortcut| !shortcut.is_empty())
            .map(|shortcut| format!("-{shortcut}|"))
            .unwrap_or_default();
        let value = if !self.accepts_value {
            String::new()
        } else if self.value_required {
            format!("={}", self.name.to_uppercase())
        } else {
            format!("[={}]", self.name.to_uppercase())
        };
        let repeat = if self.is_array { "..." } else { "" };
        format!("[{shortcut}--{}{value}]{repeat}", self.name)
    }
}
