//! # Constraint Engine Adapter
//!
//! Wraps a compiled `jsonschema::Validator`. Issues come out with fields in
//! the engine's own notation: a dotted path rooted at [`ROOT_FIELD`]
//! (`data.notes.0.title`). The context rewrites them to be root-relative.

use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

use skadi_core::{SchemaError, ValidationIssue};

use crate::options::ValidatorOptions;

/// Name the engine gives the validated document in issue fields.
pub(crate) const ROOT_FIELD: &str = "data";

pub(crate) struct Engine {
    validator: jsonschema::Validator,
    greedy: bool,
    verbose: bool,
}

impl Engine {
    /// Compile `schema` with the configured draft.
    pub(crate) fn build(schema: &Value, options: &ValidatorOptions) -> Result<Self, SchemaError> {
        let mut opts = jsonschema::options();
        opts.with_draft(options.draft.engine_draft());
        let validator = opts
            .build(schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                reason: e.to_string(),
            })?;
        Ok(Self {
            validator,
            greedy: options.greedy,
            verbose: options.verbose,
        })
    }

    /// Validate `instance`, returning every issue in greedy mode and at
    /// most one otherwise.
    pub(crate) fn run(&self, instance: &Value) -> Vec<ValidationIssue> {
        let limit = if self.greedy { usize::MAX } else { 1 };
        self.validator
            .iter_errors(instance)
            .take(limit)
            .map(|error| self.issue(&error))
            .collect()
    }

    fn issue(&self, error: &jsonschema::ValidationError<'_>) -> ValidationIssue {
        let mut field = engine_field(&error.instance_path.to_string());
        // Report a missing property on the property, not on its parent.
        if let ValidationErrorKind::Required { property } = &error.kind {
            if let Some(name) = property.as_str() {
                field.push('.');
                field.push_str(name);
            }
        }
        ValidationIssue {
            field,
            message: error.to_string(),
            value: self.verbose.then(|| error.instance.clone().into_owned()),
            schema_path: self.verbose.then(|| error.schema_path.to_string()),
        }
    }
}

/// Convert a JSON Pointer (`/notes/0/title`) into the engine's dotted form
/// (`data.notes.0.title`).
fn engine_field(pointer: &str) -> String {
    let mut field = String::from(ROOT_FIELD);
    for segment in pointer.split('/').skip(1) {
        field.push('.');
        field.push_str(&segment.replace("~1", "/").replace("~0", "~"));
    }
    field
}
