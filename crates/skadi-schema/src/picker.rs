//! # Recursive Picker
//!
//! Compiles a schema into a [`Picker`]: a reusable, stateless function that
//! returns a copy of a JSON value reduced to the shape the schema declares.
//!
//! ## Rules
//!
//! - A node whose `type` names `object` picks objects: every input key with
//!   a declared property schema is kept and picked recursively; an undeclared
//!   key is kept unchanged when the shape is open and dropped when the value
//!   under the marker key is the literal `false`. Declared properties are the
//!   union of the node's own `properties` and those contributed by `items`,
//!   `anyOf`, `oneOf` and `allOf` branches (transitively). When a name is
//!   contributed more than once, the last source wins.
//! - A node whose `type` names `array` picks arrays: element-wise with the
//!   `items` schema, or position-wise for tuple `items`, where trailing
//!   elements follow `additionalItems` (`false` drops them, a schema picks
//!   them, anything else keeps them).
//! - Any other node is the identity.
//! - A rule that does not match the runtime shape of the value (an array
//!   rule given an object) returns the value unchanged.
//!
//! ## Arena
//!
//! Compiled nodes live in a flat `Vec` addressed by node id. Local
//! `$ref`s compile to the id of their target, so recursive schemas become
//! cyclic id references instead of unbounded compilation. Picking recurses
//! over the input value, so depth is bounded by the input's nesting.
//!
//! Output object keys keep the input's order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use skadi_core::{ConfigError, ADDITIONAL_PROPERTIES};

use crate::schema::{Items, Schema, SchemaObject};
use crate::shorthand::expand;

/// Options for [`Picker`] construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerOptions {
    /// The key whose literal `false` closes an object shape. Must match
    /// the marker the schema was normalized with.
    pub additional_properties_marker: String,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            additional_properties_marker: ADDITIONAL_PROPERTIES.to_string(),
        }
    }
}

impl PickerOptions {
    /// Options reading strictness from `marker`.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            additional_properties_marker: marker.into(),
        }
    }

    /// Parse options from a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or unknown value types.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse options from a YAML document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed YAML or unknown value types.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMarker` if the marker is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.additional_properties_marker.is_empty() {
            return Err(ConfigError::InvalidMarker {
                marker: String::new(),
                reason: "marker must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Index of a compiled node in a [`Picker`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Slot 0 of every arena: returns its input unchanged.
const IDENTITY: NodeId = NodeId(0);

#[derive(Debug, Clone, Default)]
struct PickerNode {
    object: Option<ObjectRule>,
    array: Option<ArrayRule>,
}

#[derive(Debug, Clone)]
struct ObjectRule {
    properties: HashMap<String, NodeId>,
    additional: bool,
}

#[derive(Debug, Clone)]
enum ArrayRule {
    Each(NodeId),
    Tuple { items: Vec<NodeId>, rest: Rest },
}

/// Policy for tuple elements past the declared positions.
#[derive(Debug, Clone, Copy)]
enum Rest {
    Keep,
    Drop,
    Pick(NodeId),
}

/// A compiled picker.
///
/// Immutable after construction; `Send + Sync`, so one picker can serve
/// any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Picker {
    nodes: Vec<PickerNode>,
    root: NodeId,
}

impl Picker {
    /// Compile `schema`, reading strictness from the configured marker.
    ///
    /// `schema` should already be expanded; use [`create_picker`] to start
    /// from a raw JSON document.
    pub fn new(schema: &Schema, options: &PickerOptions) -> Self {
        let mut compiler = Compiler {
            root: schema,
            marker: &options.additional_properties_marker,
            nodes: vec![PickerNode::default()],
            refs: HashMap::new(),
            compiled: HashMap::new(),
        };
        let root = compiler.compile(schema);
        tracing::debug!(
            nodes = compiler.nodes.len(),
            marker = %options.additional_properties_marker,
            "compiled picker"
        );
        Self {
            nodes: compiler.nodes,
            root,
        }
    }

    /// Return a picked copy of `value`. Never mutates `value`.
    pub fn pick(&self, value: &Value) -> Value {
        self.apply(self.root, value)
    }

    /// Returns the number of compiled nodes, including the shared identity.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn apply(&self, id: NodeId, value: &Value) -> Value {
        let node = &self.nodes[id.0];
        match (value, &node.object, &node.array) {
            (Value::Object(map), Some(rule), _) => Value::Object(self.pick_object(rule, map)),
            (Value::Array(items), _, Some(rule)) => Value::Array(self.pick_array(rule, items)),
            _ => value.clone(),
        }
    }

    fn pick_object(&self, rule: &ObjectRule, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .filter_map(|(key, value)| match rule.properties.get(key) {
                Some(&id) => Some((key.clone(), self.apply(id, value))),
                None if rule.additional => Some((key.clone(), value.clone())),
                None => None,
            })
            .collect()
    }

    fn pick_array(&self, rule: &ArrayRule, items: &[Value]) -> Vec<Value> {
        match rule {
            ArrayRule::Each(id) => items.iter().map(|item| self.apply(*id, item)).collect(),
            ArrayRule::Tuple { items: positions, rest } => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match positions.get(index) {
                    Some(&id) => Some(self.apply(id, item)),
                    None => match rest {
                        Rest::Keep => Some(item.clone()),
                        Rest::Drop => None,
                        Rest::Pick(id) => Some(self.apply(*id, item)),
                    },
                })
                .collect(),
        }
    }
}

/// Expand shorthands in `schema` and compile it into a [`Picker`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidMarker` if the options are rejected.
pub fn create_picker(schema: &Value, options: &PickerOptions) -> Result<Picker, ConfigError> {
    options.validate()?;
    let schema = Schema::from_value(expand(schema));
    Ok(Picker::new(&schema, options))
}

struct Compiler<'s> {
    root: &'s Schema,
    marker: &'s str,
    nodes: Vec<PickerNode>,
    refs: HashMap<String, NodeId>,
    compiled: HashMap<*const SchemaObject, NodeId>,
}

impl<'s> Compiler<'s> {
    fn compile(&mut self, schema: &'s Schema) -> NodeId {
        let Some(object) = schema.as_object() else {
            return IDENTITY;
        };
        match object.reference.as_deref() {
            Some(reference) => self.compile_ref(reference),
            None => self.compile_object(object),
        }
    }

    fn compile_ref(&mut self, reference: &'s str) -> NodeId {
        if let Some(&id) = self.refs.get(reference) {
            return id;
        }
        let id = match self.root.resolve(reference) {
            Some(target) => self.compile_object(target),
            None => {
                tracing::debug!(reference, "unresolved $ref; picking as identity");
                IDENTITY
            }
        };
        self.refs.insert(reference.to_string(), id);
        id
    }

    /// Compile a keyword object once per tree node. The slot is reserved
    /// before building so a node reached again while its own rules are
    /// being compiled resolves to that slot.
    fn compile_object(&mut self, object: &'s SchemaObject) -> NodeId {
        let key = object as *const SchemaObject;
        if let Some(&id) = self.compiled.get(&key) {
            return id;
        }
        if !object.declares("object") && !object.declares("array") {
            return IDENTITY;
        }
        let id = self.push(PickerNode::default());
        self.compiled.insert(key, id);
        let node = self.build(object);
        self.nodes[id.0] = node;
        id
    }

    fn push(&mut self, node: PickerNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn build(&mut self, object: &'s SchemaObject) -> PickerNode {
        let object_rule = if object.declares("object") {
            Some(self.object_rule(object))
        } else {
            None
        };
        let array_rule = if object.declares("array") {
            Some(self.array_rule(object))
        } else {
            None
        };
        PickerNode {
            object: object_rule,
            array: array_rule,
        }
    }

    fn object_rule(&mut self, object: &'s SchemaObject) -> ObjectRule {
        let mut sources = Vec::new();
        let mut visited = HashSet::new();
        self.collect_properties(object, &mut sources, &mut visited);

        let mut winners: HashMap<&'s str, &'s Schema> = HashMap::new();
        for (name, schema) in sources {
            winners.insert(name, schema);
        }

        let properties = winners
            .into_iter()
            .map(|(name, schema)| (name.to_string(), self.compile(schema)))
            .collect();

        ObjectRule {
            properties,
            additional: !object.is_closed(self.marker),
        }
    }

    /// Gather `(name, schema)` pairs from the node's own `properties`, then
    /// `items`, `anyOf`, `oneOf` and `allOf`, recursively.
    fn collect_properties(
        &self,
        object: &'s SchemaObject,
        out: &mut Vec<(&'s str, &'s Schema)>,
        visited: &mut HashSet<*const SchemaObject>,
    ) {
        if !visited.insert(object as *const SchemaObject) {
            return;
        }
        if let Some(properties) = &object.properties {
            out.extend(properties.iter());
        }
        match &object.items {
            Some(Items::Single(schema)) => self.collect_from(schema, out, visited),
            Some(Items::Tuple(schemas)) => {
                for schema in schemas {
                    self.collect_from(schema, out, visited);
                }
            }
            None => {}
        }
        for branches in [&object.any_of, &object.one_of, &object.all_of]
            .into_iter()
            .flatten()
        {
            for branch in branches {
                self.collect_from(branch, out, visited);
            }
        }
    }

    fn collect_from(
        &self,
        schema: &'s Schema,
        out: &mut Vec<(&'s str, &'s Schema)>,
        visited: &mut HashSet<*const SchemaObject>,
    ) {
        let Some(object) = schema.as_object() else {
            return;
        };
        let target = match object.reference.as_deref() {
            Some(reference) => match self.root.resolve(reference) {
                Some(target) => target,
                None => return,
            },
            None => object,
        };
        self.collect_properties(target, out, visited);
    }

    fn array_rule(&mut self, object: &'s SchemaObject) -> ArrayRule {
        match &object.items {
            None => ArrayRule::Each(IDENTITY),
            Some(Items::Single(schema)) => ArrayRule::Each(self.compile(schema)),
            Some(Items::Tuple(schemas)) => {
                let items = schemas.iter().map(|schema| self.compile(schema)).collect();
                let rest = match &object.additional_items {
                    None | Some(Schema::Bool(true)) => Rest::Keep,
                    Some(Schema::Bool(false)) => Rest::Drop,
                    Some(schema) => Rest::Pick(self.compile(schema)),
                };
                ArrayRule::Tuple { items, rest }
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// Arbitrary JSON values without floats, nested a few levels deep.
    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-e]{1,2}", inner, 0..6).prop_map(|m| {
                    let map: Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    fn closed_schema() -> Value {
        json!({
            "type": ["object", "array"],
            "additionalProperties": false,
            "properties": {
                "a": {"type": "object", "additionalProperties": false, "properties": {"b": {}}},
                "c": {"type": "array", "items": {"$ref": "#"}}
            },
            "items": {"$ref": "#"}
        })
    }

    fn only_declared_keys(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.keys().all(|k| k == "a" || k == "c"),
            _ => true,
        }
    }

    proptest! {
        /// Picking never mutates its input and is deterministic.
        #[test]
        fn pick_is_pure(value in json_value()) {
            let picker = create_picker(&closed_schema(), &PickerOptions::default()).unwrap();
            let before = value.clone();
            let first = picker.pick(&value);
            let second = picker.pick(&value);
            prop_assert_eq!(&value, &before);
            prop_assert_eq!(first, second);
        }

        /// A closed root keeps only declared keys, and picking is idempotent.
        #[test]
        fn pick_whitelists_and_is_idempotent(value in json_value()) {
            let picker = create_picker(&closed_schema(), &PickerOptions::default()).unwrap();
            let picked = picker.pick(&value);
            prop_assert!(only_declared_keys(&picked));
            prop_assert_eq!(picker.pick(&picked), picked);
        }
    }
}
