//! Pre-validation instance shaping.
//!
//! Walks an instance alongside its schema, filling in missing object
//! members from `default` declarations and coercing scalars toward the
//! declared `type` where the conversion is lossless. The shaped
//! instance is what gets validated and, for request bodies, dispatched.

use serde_json::Value;

/// Shapes `instance` in place against `schema`: defaults first, then
/// scalar coercion, recursing through `properties` and `items`.
pub fn apply(schema: &Value, instance: &mut Value) {
    coerce_scalar(schema, instance);
    match instance {
        Value::Object(members) => {
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, member_schema) in properties {
                    if !members.contains_key(name) {
                        if let Some(default) = member_schema.get("default") {
                            members.insert(name.clone(), default.clone());
                        }
                    }
                    if let Some(member) = members.get_mut(name) {
                        apply(member_schema, member);
                    }
                }
            }
        }
        Value::Array(elements) => match schema.get("items") {
            // Tuple form pairs each element with its own schema.
            Some(Value::Array(tuple)) => {
                for (element, element_schema) in elements.iter_mut().zip(tuple) {
                    apply(element_schema, element);
                }
            }
            Some(element_schema) => {
                for element in elements.iter_mut() {
                    apply(element_schema, element);
                }
            }
            None => {}
        },
        _ => {}
    }
}

/// Rewrites a scalar that misses every declared type but converts
/// losslessly to one of them. Strings never absorb other scalars, so a
/// number against `{"type": "string"}` stays a violation.
fn coerce_scalar(schema: &Value, instance: &mut Value) {
    let Some(declared) = declared_types(schema) else {
        return;
    };
    if declared.iter().any(|ty| matches_type(ty, instance)) {
        return;
    }
    for ty in &declared {
        if let Some(coerced) = coerce_to(ty, instance) {
            *instance = coerced;
            return;
        }
    }
}

fn declared_types(schema: &Value) -> Option<Vec<&str>> {
    match schema.get("type")? {
        Value::String(ty) => Some(vec![ty.as_str()]),
        Value::Array(types) => Some(types.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

fn matches_type(ty: &str, instance: &Value) -> bool {
    match ty {
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => instance.is_i64() || instance.is_u64(),
        "boolean" => instance.is_boolean(),
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "null" => instance.is_null(),
        _ => false,
    }
}

fn coerce_to(ty: &str, instance: &Value) -> Option<Value> {
    match (ty, instance) {
        ("number", Value::String(text)) => {
            let parsed: f64 = text.parse().ok()?;
            serde_json::Number::from_f64(parsed).map(Value::Number)
        }
        ("integer", Value::String(text)) => text
            .parse::<i64>()
            .map(Value::from)
            .ok()
            .or_else(|| text.parse::<f64>().ok().and_then(float_to_integer)),
        ("integer", Value::Number(n)) => n.as_f64().and_then(float_to_integer),
        ("boolean", Value::String(text)) => match text.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Converts a zero-fraction float to an integer; anything lossy stays a
/// float and fails validation on its own.
fn float_to_integer(value: f64) -> Option<Value> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    {
        let truncated = value as i64;
        if (truncated as f64 - value).abs() < f64::EPSILON {
            return Some(Value::from(truncated));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_coerces_to_number() {
        let schema = json!({"type": "object", "properties": {"price": {"type": "number"}}});
        let mut instance = json!({"price": "19.99"});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"price": 19.99}));
    }

    #[test]
    fn test_zero_fraction_float_coerces_to_integer() {
        let schema = json!({"type": "object", "properties": {"count": {"type": "integer"}}});
        let mut instance = json!({"count": 5.0});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"count": 5}));
        assert!(instance["count"].is_i64());
    }

    #[test]
    fn test_fractional_float_stays_untouched() {
        let schema = json!({"type": "object", "properties": {"count": {"type": "integer"}}});
        let mut instance = json!({"count": 5.5});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"count": 5.5}));
    }

    #[test]
    fn test_number_never_coerces_to_string() {
        let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let mut instance = json!({"name": 123});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"name": 123}));
    }

    #[test]
    fn test_boolean_strings_coerce() {
        let schema = json!({"type": "object", "properties": {"active": {"type": "boolean"}}});
        let mut instance = json!({"active": "true"});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"active": true}));

        let mut instance = json!({"active": "yes"});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"active": "yes"}));
    }

    #[test]
    fn test_defaults_fill_missing_members() {
        let schema = json!({
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "default": 20},
                "query": {"type": "string"}
            }
        });
        let mut instance = json!({"query": "rust"});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"query": "rust", "limit": 20}));
    }

    #[test]
    fn test_defaults_and_coercion_recurse_through_items() {
        let schema = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "tag": {"type": "string", "default": "untagged"}
                }
            }
        });
        let mut instance = json!([{"id": "7"}, {"id": 8, "tag": "kept"}]);
        apply(&schema, &mut instance);
        assert_eq!(
            instance,
            json!([{"id": 7, "tag": "untagged"}, {"id": 8, "tag": "kept"}])
        );
    }

    #[test]
    fn test_present_member_is_not_overwritten_by_default() {
        let schema = json!({
            "type": "object",
            "properties": {"limit": {"type": "integer", "default": 20}}
        });
        let mut instance = json!({"limit": 5});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"limit": 5}));
    }

    #[test]
    fn test_multi_type_schema_skips_matching_instance() {
        let schema = json!({"type": "object", "properties": {"id": {"type": ["integer", "null"]}}});
        let mut instance = json!({"id": null});
        apply(&schema, &mut instance);
        assert_eq!(instance, json!({"id": null}));
    }
}
