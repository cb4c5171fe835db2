//! # skadi-validate — Validate and Sanitize
//!
//! Compiles a schema into a [`Validator`] that checks inputs with the
//! `jsonschema` engine and returns a sanitized copy holding only the
//! properties the schema declares.
//!
//! ## Pipeline
//!
//! ```text
//! schema ─▶ expand ─▶ normalize ─┬─▶ jsonschema validator ─▶ issues
//!                                └─▶ picker ───────────────▶ picked value
//! ```
//!
//! Normalization moves every `additionalProperties: false` to a marker key,
//! so the engine accepts unknown properties and the picker strips them.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use skadi_validate::{create_validator, ValidatorOptions};
//!
//! let validator = create_validator(
//!     &json!({
//!         "type": "object",
//!         "additionalProperties": false,
//!         "properties": { "name": { "type": "string", "required": true } }
//!     }),
//!     ValidatorOptions::default(),
//! )
//! .unwrap();
//!
//! let err = validator.validate(&json!({"name": 123})).unwrap_err();
//! assert_eq!(err.errors[0].field, "name");
//!
//! let picked = validator.validate(&json!({"name": "ok", "other": 1})).unwrap();
//! assert_eq!(picked, json!({"name": "ok"}));
//! ```

pub mod context;
mod engine;
pub mod options;
pub mod validator;

pub use context::{Outcome, ValidationContext};
pub use options::{SchemaDraft, ValidatorOptions};
pub use validator::{create_validator, ErrorFactory, Validator};

pub use skadi_core::{ConfigError, SchemaError, SkadiError, ValidationError, ValidationIssue};
pub use skadi_schema::{create_picker, Picker, PickerOptions};
