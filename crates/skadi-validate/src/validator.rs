//! # Validator
//!
//! Compiles a schema once (expand, normalize, build the engine, build the
//! picker) and validates any number of inputs against it.
//!
//! ## Thread Safety
//!
//! `Validator` is `Send + Sync` when its error type allows. Nothing is
//! mutated after construction; every call gets its own
//! [`ValidationContext`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use skadi_core::{SchemaError, SkadiError, ValidationError, ValidationIssue};
use skadi_schema::{expand, normalize_with_marker, Picker, PickerOptions, Schema};

use crate::context::ValidationContext;
use crate::engine::Engine;
use crate::options::ValidatorOptions;

/// Builds the error raised for an invalid input.
pub type ErrorFactory<E> = Arc<dyn Fn(Vec<ValidationIssue>) -> E + Send + Sync>;

/// A compiled validate-and-sanitize function.
pub struct Validator<E = ValidationError> {
    schema: Value,
    engine: Engine,
    picker: Picker,
    create_error: ErrorFactory<E>,
    options: ValidatorOptions,
}

impl Validator<ValidationError> {
    /// Compile `schema` with default options.
    ///
    /// # Errors
    ///
    /// Returns `SkadiError::Schema` if the engine rejects the schema.
    pub fn new(schema: &Value) -> Result<Self, SkadiError> {
        Self::with_options(schema, ValidatorOptions::default())
    }

    /// Compile `schema` with `options`, raising [`ValidationError`].
    ///
    /// # Errors
    ///
    /// Returns `SkadiError::Config` for rejected options and
    /// `SkadiError::Schema` if the engine rejects the schema.
    pub fn with_options(schema: &Value, options: ValidatorOptions) -> Result<Self, SkadiError> {
        Validator::with_error_factory(schema, options, ValidationError::new)
    }
}

impl<E> Validator<E> {
    /// Compile `schema` with `options`, raising whatever `create_error`
    /// builds from the issue list.
    ///
    /// # Errors
    ///
    /// Returns `SkadiError::Config` for rejected options and
    /// `SkadiError::Schema` if the schema cannot be serialized or the
    /// engine rejects it.
    pub fn with_error_factory<F>(
        schema: &Value,
        options: ValidatorOptions,
        create_error: F,
    ) -> Result<Self, SkadiError>
    where
        F: Fn(Vec<ValidationIssue>) -> E + Send + Sync + 'static,
    {
        options.validate()?;

        let marker = options.additional_properties_marker.as_str();
        let normalized = normalize_with_marker(&Schema::from_value(expand(schema)), marker);
        let schema = normalized.to_value().map_err(SchemaError::from)?;
        let engine = Engine::build(&schema, &options)?;
        let picker = Picker::new(&normalized, &PickerOptions::with_marker(marker));

        tracing::debug!(
            greedy = options.greedy,
            verbose = options.verbose,
            draft = ?options.draft,
            "compiled validator"
        );

        Ok(Self {
            schema,
            engine,
            picker,
            create_error: Arc::new(create_error),
            options,
        })
    }

    /// Validate `input` and return a context holding the issues.
    pub fn context<'v>(&'v self, input: &'v Value) -> ValidationContext<'v, E> {
        let errors = self.engine.run(input);
        ValidationContext::new(self, input, errors)
    }

    /// Validate `input` and return its picked copy.
    ///
    /// # Errors
    ///
    /// Returns the factory's error carrying every issue if `input` is invalid.
    pub fn validate(&self, input: &Value) -> Result<Value, E> {
        self.context(input).end()
    }

    /// Validate `input` and return its picked copy, or `None` if invalid.
    pub fn validate_or_none(&self, input: &Value) -> Option<Value> {
        self.context(input).end_or_none()
    }

    /// The normalized schema the engine was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The compiled picker.
    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    /// The options this validator was built with.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub(crate) fn create_error(&self, errors: Vec<ValidationIssue>) -> E {
        (self.create_error)(errors)
    }
}

impl<E> fmt::Debug for Validator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .field("picker_nodes", &self.picker.node_count())
            .finish_non_exhaustive()
    }
}

/// Compile `schema` into a [`Validator`] raising [`ValidationError`].
///
/// # Errors
///
/// See [`Validator::with_options`].
pub fn create_validator(schema: &Value, options: ValidatorOptions) -> Result<Validator, SkadiError> {
    Validator::with_options(schema, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skadi_core::ConfigError;

    #[test]
    fn test_schema_is_normalized_and_expanded() {
        let v = Validator::new(&json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"name": {"type": "string", "required": true}}
        }))
        .unwrap();
        assert_eq!(
            v.schema(),
            &json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"],
                "_additionalProperties": false
            })
        );
    }

    #[test]
    fn test_custom_marker_flows_to_engine_and_picker() {
        let v = Validator::with_options(
            &json!({"type": "object", "additionalProperties": false, "properties": {"a": {}}}),
            ValidatorOptions {
                additional_properties_marker: "x-closed".to_string(),
                ..ValidatorOptions::default()
            },
        )
        .unwrap();
        assert_eq!(v.schema()["x-closed"], json!(false));
        assert_eq!(v.validate(&json!({"a": 1, "b": 2})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_rejects_invalid_options() {
        let err = Validator::with_options(
            &json!({}),
            ValidatorOptions {
                additional_properties_marker: String::new(),
                ..ValidatorOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, SkadiError::Config(ConfigError::InvalidMarker { .. })));
    }

    #[test]
    fn test_schema_errors_propagate() {
        let err = Validator::new(&json!({"type": "object", "minProperties": "three"})).unwrap_err();
        assert!(matches!(err, SkadiError::Schema(SchemaError::ValidatorBuild { .. })));
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn test_debug_omits_factory() {
        let v = Validator::new(&json!({"type": "string"})).unwrap();
        let debug = format!("{v:?}");
        assert!(debug.contains("Validator"));
        assert!(debug.contains("picker_nodes"));
    }
}
