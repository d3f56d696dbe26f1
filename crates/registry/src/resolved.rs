use std::sync::Arc;

use consoleport_types::{ArgumentSpec, CommandDefinition, ENV_OPTION_NAME, OptionSpec};

/// A command looked up in the registry, with its option set augmented.
///
/// The synthetic `env` option is merged exactly once, here. Schema
/// projection, rule derivation and parameter marshaling all read
/// [`ResolvedCommand::options`] rather than the raw definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    definition: Arc<CommandDefinition>,
    options: Vec<OptionSpec>,
}

impl ResolvedCommand {
    pub fn new(definition: Arc<CommandDefinition>) -> Self {
        let options = augment_options(&definition.options);
        Self { definition, options }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.definition.arguments
    }

    /// Declared options plus the synthetic `env` option.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn is_option(&self, name: &str) -> bool {
        self.options.iter().any(|option| option.name == name)
    }

    pub fn is_argument(&self, name: &str) -> bool {
        self.definition.arguments.iter().any(|argument| argument.name == name)
    }
}

impl From<CommandDefinition> for ResolvedCommand {
    fn from(definition: CommandDefinition) -> Self {
        Self::new(Arc::new(definition))
    }
}

/// Merges the synthetic `env` option into `declared`.
///
/// A declared `env` option is replaced in place; otherwise the synthetic option
/// is appended. Either way `env` appears exactly once.
pub fn augment_options(declared: &[OptionSpec]) -> Vec<OptionSpec> {
    let mut options: Vec<OptionSpec> = declared.iter().filter(|option| option.name != ENV_OPTION_NAME).cloned().collect();
    match declared.iter().position(|option| option.name == ENV_OPTION_NAME) {
        Some(index) => options.insert(index, OptionSpec::env()),
        None => options.push(OptionSpec::env()),
    }
    options
}
