//! # Schema Normalization
//!
//! Moves every `additionalProperties: false` to a marker key so the
//! constraint engine accepts unknown properties at validate time, while the
//! picker still sees which shapes are closed and strips them.
//!
//! ## Invariants
//!
//! - Only the literal `false` is moved. A subschema, `true`, or an absent
//!   keyword stays where it is.
//! - A normalized node never carries both `additionalProperties` and the
//!   marker: a stray marker next to a kept `additionalProperties` is removed.
//! - Normalization is idempotent and never mutates its input.
//!
//! The walk descends into `items`, `anyOf`, `oneOf`, `allOf`, `not`,
//! `definitions` and `properties`. Boolean and passthrough nodes are
//! returned unchanged.

use serde_json::Value;

use skadi_core::{ADDITIONAL_PROPERTIES, DEFAULT_MARKER};

use crate::schema::{Items, Schema, SchemaObject};

/// Normalize `schema` using [`DEFAULT_MARKER`].
pub fn normalize(schema: &Schema) -> Schema {
    normalize_with_marker(schema, DEFAULT_MARKER)
}

/// Normalize `schema`, moving `additionalProperties: false` to `marker`.
///
/// A marker equal to `additionalProperties` makes this a plain copy.
pub fn normalize_with_marker(schema: &Schema, marker: &str) -> Schema {
    if marker == ADDITIONAL_PROPERTIES {
        return schema.clone();
    }
    normalize_node(schema, marker)
}

fn normalize_node(schema: &Schema, marker: &str) -> Schema {
    match schema {
        Schema::Object(object) => Schema::Object(Box::new(normalize_object(object, marker))),
        other => other.clone(),
    }
}

fn normalize_object(object: &SchemaObject, marker: &str) -> SchemaObject {
    let node = |schema: &Schema| normalize_node(schema, marker);
    let list = |schemas: &Vec<Schema>| schemas.iter().map(node).collect::<Vec<_>>();

    let mut normalized = SchemaObject {
        instance_type: object.instance_type.clone(),
        reference: object.reference.clone(),
        properties: object.properties.as_ref().map(|map| map.map_values(node)),
        items: object.items.as_ref().map(|items| match items {
            Items::Single(schema) => Items::Single(node(schema)),
            Items::Tuple(schemas) => Items::Tuple(list(schemas)),
        }),
        additional_items: object.additional_items.clone(),
        additional_properties: object.additional_properties.clone(),
        any_of: object.any_of.as_ref().map(list),
        one_of: object.one_of.as_ref().map(list),
        all_of: object.all_of.as_ref().map(list),
        not: object.not.as_ref().map(node),
        definitions: object.definitions.as_ref().map(|map| map.map_values(node)),
        extra: object.extra.clone(),
    };

    match normalized.additional_properties {
        Some(Schema::Bool(false)) => {
            normalized.additional_properties = None;
            normalized.extra.insert(marker.to_string(), Value::Bool(false));
        }
        Some(_) => normalized.extra.retain(|key, _| key != marker),
        None => {}
    }

    normalized
}
