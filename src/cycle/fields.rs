// Attribute field resolution
//
// Tracker fields come in several shapes (plain scalars, option objects with
// a `value`, named objects, lists of either). Attributes are reduced to a
// single scalar so they fit in one table cell.

use serde_json::Value;

/// Reduce a raw field value to the scalar shown in the record.
///
/// - missing or null -> null
/// - object -> its `value` member, else its `name` member, else the object
/// - list -> null when empty, otherwise the first element (its `name` member
///   when the element is an object that has one)
pub fn resolve_field_value(raw: Option<&Value>) -> Value {
    let Some(raw) = raw else { return Value::Null };

    let value = match raw {
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("name"))
            .unwrap_or(raw),
        other => other,
    };

    match value {
        Value::Array(items) => match items.first() {
            None => Value::Null,
            Some(Value::Object(map)) => map
                .get("name")
                .cloned()
                .unwrap_or_else(|| Value::Object(map.clone())),
            Some(first) => first.clone(),
        },
        other => other.clone(),
    }
}

/// Render a resolved value for a text cell (null -> empty)
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(resolve_field_value(None), Value::Null);
        assert_eq!(resolve_field_value(Some(&Value::Null)), Value::Null);
        assert_eq!(resolve_field_value(Some(&json!(5))), json!(5));
        assert_eq!(resolve_field_value(Some(&json!("Team A"))), json!("Team A"));
    }

    #[test]
    fn test_option_objects() {
        let option = json!({"self": "https://x/1", "value": "Large", "id": "1"});
        assert_eq!(resolve_field_value(Some(&option)), json!("Large"));

        let named = json!({"name": "Release 1", "id": "10"});
        assert_eq!(resolve_field_value(Some(&named)), json!("Release 1"));

        let opaque = json!({"id": "10"});
        assert_eq!(resolve_field_value(Some(&opaque)), opaque);
    }

    #[test]
    fn test_lists_take_first_element() {
        assert_eq!(resolve_field_value(Some(&json!([]))), Value::Null);
        assert_eq!(resolve_field_value(Some(&json!(["a", "b"]))), json!("a"));
        let versions = json!([{"name": "1.0"}, {"name": "1.1"}]);
        assert_eq!(resolve_field_value(Some(&versions)), json!("1.0"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!(3.5)), "3.5");
    }
}
