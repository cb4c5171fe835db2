//! # skadi-schema — Schema Tree, Normalization & Picking
//!
//! Turns a JSON-Schema-like document into the two artifacts the validator
//! needs:
//!
//! 1. A **normalized schema** ([`normalize`]) in which every
//!    `additionalProperties: false` has moved to a marker key, so the
//!    constraint engine stops rejecting unknown properties.
//! 2. A **picker** ([`Picker`]) compiled from that schema, which strips the
//!    unknown properties instead.
//!
//! Shorthand notation (`"string"`, `{"object": {..}}`, `required: true`) is
//! expanded first by [`expand`].
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use skadi_schema::{create_picker, PickerOptions};
//!
//! let picker = create_picker(
//!     &json!({
//!         "type": "object",
//!         "additionalProperties": false,
//!         "properties": { "a": "string" }
//!     }),
//!     &PickerOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(picker.pick(&json!({"a": "x", "b": "y"})), json!({"a": "x"}));
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `skadi-core` internally.
//! - Every transformation is pure; inputs are never mutated.

pub mod normalize;
pub mod picker;
pub mod schema;
pub mod shorthand;

pub use normalize::{normalize, normalize_with_marker};
pub use picker::{create_picker, Picker, PickerOptions};
pub use schema::{InstanceType, Items, Schema, SchemaMap, SchemaObject};
pub use shorthand::expand;
