//! Enforces a [`ValidationRuleSet`] over a request payload.
//!
//! The checks follow the usual web-framework semantics for the tokens the
//! rule deriver emits:
//! - `required`: present and not null, blank text or an empty array
//! - `nullable`: null passes without further checks
//! - `string` / `array`: JSON type must match
//! - `bool`: `true`, `false`, `0`, `1`, `"0"` or `"1"`

use consoleport_types::{RuleToken, ValidationErrors, ValidationRuleSet};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Fields that passed validation, in rule order.
pub type ValidatedInput = IndexMap<String, Value>;

/// Validates `input` against `rules`.
///
/// Fields without a rule are dropped. Fields that are absent and not required
/// are omitted from the result.
pub fn validate_input(rules: &ValidationRuleSet, input: &Map<String, Value>) -> Result<ValidatedInput, ValidationErrors> {
    let mut validated = ValidatedInput::new();
    let mut errors = ValidationErrors::new();

    for (field, tokens) in rules.iter() {
        let value = input.get(field);
        let attribute = field.replace('_', " ");

        if tokens.contains(&RuleToken::Required) && value.is_none_or(is_blank) {
            errors.add(field, format!("The {attribute} field is required."));
            continue;
        }
        let Some(value) = value else {
            continue;
        };
        if value.is_null() && tokens.contains(&RuleToken::Nullable) {
            validated.insert(field.to_string(), Value::Null);
            continue;
        }

        let mut field_valid = true;
        for token in tokens.iter().filter(|token| !token.is_presence()) {
            if let Some(message) = check_type(*token, value, &attribute) {
                errors.add(field, message);
                field_valid = false;
            }
        }
        if field_valid {
            validated.insert(field.to_string(), value.clone());
        }
    }

    if errors.is_empty() { Ok(validated) } else { Err(errors) }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn check_type(token: RuleToken, value: &Value, attribute: &str) -> Option<String> {
    let valid = match token {
        RuleToken::String => value.is_string(),
        RuleToken::Array => value.is_array(),
        RuleToken::Bool => is_boolean_like(value),
        RuleToken::Required | RuleToken::Nullable => true,
    };
    if valid {
        return None;
    }
    Some(match token {
        RuleToken::String => format!("The {attribute} field must be a string."),
        RuleToken::Array => format!("The {attribute} field must be an array."),
        _ => format!("The {attribute} field must be true or false."),
    })
}

fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(number) => matches!(number.as_i64(), Some(0 | 1)),
        Value::String(text) => text == "0" || text == "1",
        _ => false,
    }
}
