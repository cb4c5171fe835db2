//! # Shorthand Expansion
//!
//! Expands the compact schema notation into plain JSON Schema before
//! normalization. Supported forms:
//!
//! | Shorthand | Expansion |
//! |-----------|-----------|
//! | `"string"` | `{"type": "string"}` |
//! | `"#/definitions/user"` | `{"$ref": "#/definitions/user"}` |
//! | `{"object": {..}}` | `{"type": "object", "properties": {..}}` |
//! | `{"array": s}` | `{"type": "array", "items": s}` |
//! | property with `"required": true` | name added to the parent's `required` list |
//! | `{"type": "any"}` | `{}` |
//!
//! Expansion is pure: the input is never modified.

use serde_json::{json, Map, Value};

/// Keywords holding a `name -> schema` map.
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "definitions", "patternProperties"];

/// Keywords holding a list of schemas.
const SCHEMA_LIST_KEYWORDS: &[&str] = &["anyOf", "oneOf", "allOf"];

/// Keywords holding a single schema.
const SCHEMA_KEYWORDS: &[&str] = &["additionalProperties", "additionalItems", "not"];

/// Expand every shorthand in `schema`.
///
/// A boolean `required` on the root has no parent to be hoisted into and
/// is dropped.
pub fn expand(schema: &Value) -> Value {
    expand_node(schema).0
}

/// Expand one node. The flag is the node's own boolean `required`, which
/// has already been removed from the returned value.
fn expand_node(schema: &Value) -> (Value, bool) {
    match schema {
        Value::String(shorthand) => (expand_string(shorthand), false),
        Value::Object(map) => {
            let (map, required) = expand_object(map);
            (Value::Object(map), required)
        }
        other => (other.clone(), false),
    }
}

fn expand_string(shorthand: &str) -> Value {
    if shorthand.starts_with('#') {
        json!({ "$ref": shorthand })
    } else if shorthand == "any" {
        json!({})
    } else {
        json!({ "type": shorthand })
    }
}

fn expand_object(source: &Map<String, Value>) -> (Map<String, Value>, bool) {
    let mut map = source.clone();

    let own_required = match map.get("required") {
        Some(Value::Bool(flag)) => Some(*flag),
        _ => None,
    };
    if own_required.is_some() {
        map.retain(|key, _| key != "required");
    }
    let own_required = own_required.unwrap_or(false);

    if let Some(properties) = map.remove("object") {
        map.entry("type").or_insert_with(|| json!("object"));
        if let Value::Object(shorthand) = properties {
            let target = map
                .entry("properties")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(target) = target {
                for (name, schema) in shorthand {
                    target.entry(name).or_insert(schema);
                }
            }
        }
    }

    if let Some(items) = map.remove("array") {
        map.entry("type").or_insert_with(|| json!("array"));
        map.entry("items").or_insert(items);
    }

    if map.get("type").and_then(Value::as_str) == Some("any") {
        map.retain(|key, _| key != "type");
    }

    let mut hoisted = Vec::new();
    for keyword in SCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(children)) = map.get_mut(*keyword) {
            for (name, child) in children.iter_mut() {
                let (expanded, required) = expand_node(child);
                // Only `properties` children are fields of this object.
                if required && *keyword == "properties" {
                    hoisted.push(name.clone());
                }
                *child = expanded;
            }
        }
    }

    for keyword in SCHEMA_LIST_KEYWORDS {
        if let Some(Value::Array(children)) = map.get_mut(*keyword) {
            for child in children.iter_mut() {
                *child = expand(child);
            }
        }
    }

    for keyword in SCHEMA_KEYWORDS {
        if let Some(child) = map.get_mut(*keyword) {
            *child = expand(child);
        }
    }

    if let Some(items) = map.get_mut("items") {
        match items {
            Value::Array(children) => {
                for child in children.iter_mut() {
                    *child = expand(child);
                }
            }
            other => *other = expand(other),
        }
    }

    if !hoisted.is_empty() {
        let required = map
            .entry("required")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(names) = required {
            for name in hoisted {
                let name = Value::String(name);
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    (map, own_required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_shorthand() {
        assert_eq!(expand(&json!("string")), json!({"type": "string"}));
        assert_eq!(
            expand(&json!("#/definitions/user")),
            json!({"$ref": "#/definitions/user"})
        );
        assert_eq!(expand(&json!("any")), json!({}));
    }

    #[test]
    fn test_object_and_array_shorthand() {
        let expanded = expand(&json!({
            "properties": {
                "tags": {"array": "string"},
                "owner": {"object": {"id": "number"}}
            }
        }));
        assert_eq!(
            expanded["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            expanded["properties"]["owner"],
            json!({"type": "object", "properties": {"id": {"type": "number"}}})
        );
    }

    #[test]
    fn test_required_flags_are_hoisted() {
        let expanded = expand(&json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "required": true},
                "age": {"type": "number", "required": true},
                "nick": {"type": "string", "required": false}
            }
        }));
        assert_eq!(expanded["required"], json!(["name", "age"]));
        assert!(expanded["properties"]["name"].get("required").is_none());
        assert!(expanded["properties"]["nick"].get("required").is_none());
    }

    #[test]
    fn test_root_boolean_required_is_dropped() {
        let expanded = expand(&json!({"type": "string", "required": true}));
        assert_eq!(expanded, json!({"type": "string"}));
    }

    #[test]
    fn test_expansion_reaches_composites_and_items() {
        let expanded = expand(&json!({
            "oneOf": [{"object": {"kind": {"enum": ["Cat"], "required": true}}}],
            "not": "number",
            "items": ["string", {"array": "number"}],
            "additionalProperties": "string",
            "definitions": {"id": "integer"}
        }));
        assert_eq!(expanded["oneOf"][0]["required"], json!(["kind"]));
        assert_eq!(expanded["not"], json!({"type": "number"}));
        assert_eq!(expanded["items"][0], json!({"type": "string"}));
        assert_eq!(expanded["items"][1]["items"], json!({"type": "number"}));
        assert_eq!(expanded["additionalProperties"], json!({"type": "string"}));
        assert_eq!(expanded["definitions"]["id"], json!({"type": "integer"}));
    }

    #[test]
    fn test_any_type_is_removed() {
        let expanded = expand(&json!({"type": "any", "description": "free-form"}));
        assert_eq!(expanded, json!({"description": "free-form"}));
    }

    #[test]
    fn test_non_schema_values_pass_through() {
        assert_eq!(expand(&json!(true)), json!(true));
        assert_eq!(expand(&json!(42)), json!(42));
    }

    #[test]
    fn test_input_is_untouched() {
        let source = json!({"properties": {"name": "string"}});
        let before = source.clone();
        let _ = expand(&source);
        assert_eq!(source, before);
    }
}
