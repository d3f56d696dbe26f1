//! Derives validation rules from command metadata.

use consoleport_registry::ResolvedCommand;
use consoleport_types::{RuleToken, ValidationRuleSet};

/// Builds the rule set for a command's arguments and augmented options.
///
/// - arguments: `required` or `nullable`
/// - options: `required` when a value is required, else `nullable`, followed
///   by `array`/`string` for value-accepting options or `bool` for flags
pub fn derive_rules(command: &ResolvedCommand) -> ValidationRuleSet {
    let mut rules = ValidationRuleSet::new();

    for argument in command.arguments() {
        let presence = if argument.required { RuleToken::Required } else { RuleToken::Nullable };
        rules.insert(argument.name.clone(), vec![presence]);
    }

    for option in command.options() {
        let presence = if option.value_required { RuleToken::Required } else { RuleToken::Nullable };
        let kind = match (option.accepts_value, option.is_array) {
            (true, true) => RuleToken::Array,
            (true, false) => RuleToken::String,
            (false, _) => RuleToken::Bool,
        };
        rules.insert(option.name.clone(), vec![presence, kind]);
    }

    rules
}
