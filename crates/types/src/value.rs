use serde_json::Value;

/// Whether a value counts as "not supplied".
///
/// Null, `false`, zero, the empty string, the string `"0"` and empty
/// collections are all treated as absent. A caller therefore cannot pass an
/// explicit empty or zero value, and a falsy default is reported as no default.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

/// Drops empty values, see [`is_empty_value`].
pub fn non_empty(value: Option<&Value>) -> Option<Value> {
    value.filter(|value| !is_empty_value(value)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_are_empty() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(is_empty_value(&value), "{value} should be empty");
        }
    }

    #[test]
    fn truthy_values_are_kept() {
        for value in [json!(true), json!(5), json!("5"), json!(" "), json!("false"), json!(["a"]), json!({"a": 1})] {
            assert!(!is_empty_value(&value), "{value} should not be empty");
        }
        assert_eq!(non_empty(Some(&json!("local"))), Some(json!("local")));
        assert_eq!(non_empty(Some(&json!(""))), None);
        assert_eq!(non_empty(None), None);
    }
}
