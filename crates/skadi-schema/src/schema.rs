//! # Schema Tree
//!
//! A typed view over a JSON-Schema-like document. Only the keywords that
//! shape a value (and therefore matter to normalization and picking) get
//! typed slots; every other keyword is carried verbatim in
//! [`SchemaObject::extra`] so a schema survives a round trip through this
//! model without losing constraints the engine needs.
//!
//! Nodes that are neither objects nor booleans (an unexpanded `"string"`
//! shorthand, a malformed keyword value) are preserved as
//! [`Schema::Other`] and pass through every transformation unchanged.

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use skadi_core::ADDITIONAL_PROPERTIES;

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    /// A boolean schema (`true` accepts anything, `false` nothing).
    Bool(bool),
    /// A keyword object.
    Object(Box<SchemaObject>),
    /// Anything else, kept verbatim.
    Other(Value),
}

impl Schema {
    /// Build a schema tree from a JSON value. Never fails: objects whose
    /// typed keywords have an unexpected shape become [`Schema::Other`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Bool(b) => Schema::Bool(b),
            Value::Object(_) => match SchemaObject::deserialize(&value) {
                Ok(object) => Schema::Object(Box::new(object)),
                Err(_) => Schema::Other(value),
            },
            other => Schema::Other(other),
        }
    }

    /// Serialize the tree back into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a passthrough value cannot be
    /// represented, which does not happen for trees built from JSON.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the keyword object, if this node is one.
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Schema::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Resolve a same-document reference (`#`, `#/definitions/user`,
    /// `#/properties/notes/items`) against this node as the root.
    ///
    /// Only the typed keywords are traversable; pointers into passthrough
    /// keywords resolve to `None`.
    pub fn pointer(&self, reference: &str) -> Option<&Schema> {
        let path = reference.strip_prefix('#')?;
        if path.is_empty() {
            return Some(self);
        }
        let path = path.strip_prefix('/')?;

        let mut segments = path.split('/').map(unescape_segment);
        let mut current = self;
        while let Some(keyword) = segments.next() {
            let object = current.as_object()?;
            current = match keyword.as_str() {
                "properties" => object.properties.as_ref()?.get(&segments.next()?)?,
                "definitions" => object.definitions.as_ref()?.get(&segments.next()?)?,
                "items" => match object.items.as_ref()? {
                    Items::Single(schema) => schema,
                    Items::Tuple(list) => list.get(parse_index(&segments.next()?)?)?,
                },
                "anyOf" => object.any_of.as_ref()?.get(parse_index(&segments.next()?)?)?,
                "oneOf" => object.one_of.as_ref()?.get(parse_index(&segments.next()?)?)?,
                "allOf" => object.all_of.as_ref()?.get(parse_index(&segments.next()?)?)?,
                "not" => object.not.as_ref()?,
                "additionalProperties" => object.additional_properties.as_ref()?,
                "additionalItems" => object.additional_items.as_ref()?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Follow a chain of `$ref`s starting at `reference` until a node that
    /// is not itself a reference. Returns `None` for unresolvable or cyclic
    /// chains.
    pub fn resolve<'s>(&'s self, reference: &'s str) -> Option<&'s SchemaObject> {
        let mut seen = HashSet::new();
        let mut current = reference;
        loop {
            if !seen.insert(current) {
                return None;
            }
            let object = self.pointer(current)?.as_object()?;
            match object.reference.as_deref() {
                Some(next) => current = next,
                None => return Some(object),
            }
        }
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn parse_index(segment: &str) -> Option<usize> {
    segment.parse().ok()
}

/// A keyword object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    /// `type`: one name or a list of names.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,
    /// `$ref`: a reference to another node.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SchemaMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<SchemaMap>,
    /// Every other keyword, in document order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaObject {
    /// Returns true if `type` names `type_name` (directly or in a list).
    pub fn declares(&self, type_name: &str) -> bool {
        self.instance_type
            .as_ref()
            .is_some_and(|t| t.includes(type_name))
    }

    /// Returns true if the value stored under `marker` is the literal
    /// `false`. Any other value, or no value, leaves the shape open.
    pub fn is_closed(&self, marker: &str) -> bool {
        if marker == ADDITIONAL_PROPERTIES {
            matches!(self.additional_properties, Some(Schema::Bool(false)))
        } else {
            matches!(self.extra.get(marker), Some(Value::Bool(false)))
        }
    }
}

/// The value of `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstanceType {
    Single(String),
    Many(Vec<String>),
}

impl InstanceType {
    /// Returns true if this type set contains `type_name`.
    pub fn includes(&self, type_name: &str) -> bool {
        match self {
            InstanceType::Single(name) => name == type_name,
            InstanceType::Many(names) => names.iter().any(|n| n == type_name),
        }
    }
}

/// The value of `items`: one schema for every element, or one per position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    // Tried first: `Single` would otherwise swallow arrays as `Schema::Other`.
    Tuple(Vec<Schema>),
    Single(Schema),
}

/// An insertion-ordered `name -> schema` mapping, used for `properties`
/// and `definitions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMap {
    entries: Vec<(String, Schema)>,
}

impl SchemaMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, schema)| schema)
    }

    /// Insert or replace an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = schema,
            None => self.entries.push((name, schema)),
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.entries.iter().map(|(key, schema)| (key.as_str(), schema))
    }

    /// Build a new map with the same keys in the same order.
    pub fn map_values(&self, mut f: impl FnMut(&Schema) -> Schema) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(key, schema)| (key.clone(), f(schema)))
                .collect(),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Schema)> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = (String, Schema)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, schema) in iter {
            map.insert(name, schema);
        }
        map
    }
}

impl Serialize for SchemaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, schema) in &self.entries {
            map.serialize_entry(key, schema)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaMapVisitor;

        impl<'de> Visitor<'de> for SchemaMapVisitor {
            type Value = SchemaMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of names to schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SchemaMap, A::Error> {
                let mut map = SchemaMap::new();
                while let Some((name, schema)) = access.next_entry::<String, Schema>()? {
                    map.insert(name, schema);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(SchemaMapVisitor)
    }
}
