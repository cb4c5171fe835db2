//! # Validation Context
//!
//! A short-lived, per-input object. The constraint engine runs eagerly when
//! the context is created; afterwards the caller may inspect or edit
//! [`ValidationContext::errors`] before deciding how to end it.
//!
//! Validity and sanitization are orthogonal: [`ValidationContext::pick`]
//! always works on the raw input, whatever the error list holds.

use std::mem;

use serde_json::Value;

use skadi_core::{ValidationError, ValidationIssue};

use crate::engine::ROOT_FIELD;
use crate::validator::Validator;

/// The result of ending a context.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The input was valid; carries the picked value.
    Valid(Value),
    /// The input was invalid; carries the issues.
    Invalid(Vec<ValidationIssue>),
}

impl Outcome {
    /// Returns true for [`Outcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }

    /// Convert into a `Result` over the raw issue list.
    pub fn into_result(self) -> Result<Value, Vec<ValidationIssue>> {
        match self {
            Outcome::Valid(value) => Ok(value),
            Outcome::Invalid(errors) => Err(errors),
        }
    }

    /// The picked value, or `None` if invalid.
    pub fn into_option(self) -> Option<Value> {
        self.into_result().ok()
    }
}

/// Per-input validation state.
pub struct ValidationContext<'v, E = ValidationError> {
    /// Issues found by the engine, with root-relative fields. Callers may
    /// push, remove or clear entries; an empty list means valid.
    pub errors: Vec<ValidationIssue>,
    input: &'v Value,
    validator: &'v Validator<E>,
}

impl<'v, E> ValidationContext<'v, E> {
    pub(crate) fn new(
        validator: &'v Validator<E>,
        input: &'v Value,
        errors: Vec<ValidationIssue>,
    ) -> Self {
        let errors: Vec<ValidationIssue> = errors.into_iter().map(root_relative).collect();
        tracing::trace!(issues = errors.len(), "validation context created");
        Self {
            errors,
            input,
            validator,
        }
    }

    /// Returns true if the error list is empty.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return the picked copy of the input, regardless of validity.
    pub fn pick(&self) -> Value {
        self.validator.picker().pick(self.input)
    }

    /// Append a caller-defined issue.
    pub fn push_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    /// Remove and return every issue, leaving the context valid.
    pub fn take_errors(&mut self) -> Vec<ValidationIssue> {
        mem::take(&mut self.errors)
    }

    /// The input this context validates.
    pub fn input(&self) -> &'v Value {
        self.input
    }

    /// End the context without raising.
    pub fn into_outcome(self) -> Outcome {
        if self.valid() {
            Outcome::Valid(self.pick())
        } else {
            Outcome::Invalid(self.errors)
        }
    }

    /// End the context: the picked value if valid, otherwise the error
    /// built by the validator's error factory.
    ///
    /// # Errors
    ///
    /// Returns the factory's error (by default [`ValidationError`]) carrying
    /// every issue when the context is invalid.
    pub fn end(self) -> Result<Value, E> {
        let validator = self.validator;
        self.into_outcome()
            .into_result()
            .map_err(|errors| validator.create_error(errors))
    }

    /// End the context: the picked value if valid, otherwise `None`.
    pub fn end_or_none(self) -> Option<Value> {
        self.into_outcome().into_option()
    }
}

/// Strip the engine's root name from an issue field: `data.name` becomes
/// `name`, and a bare `data` becomes the empty root field.
fn root_relative(mut issue: ValidationIssue) -> ValidationIssue {
    if issue.field == ROOT_FIELD {
        issue.field.clear();
    } else if let Some(rest) = issue
        .field
        .strip_prefix(ROOT_FIELD)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        issue.field = rest.to_string();
    }
    issue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ValidatorOptions;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(&json!({
            "additionalProperties": false,
            "type": "object",
            "properties": {
                "name": "string",
                "age": {"type": "number"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_root_relative_fields() {
        assert_eq!(root_relative(ValidationIssue::new("data.name", "m")).field, "name");
        assert_eq!(root_relative(ValidationIssue::new("data.a.0.b", "m")).field, "a.0.b");
        assert_eq!(root_relative(ValidationIssue::new("data", "m")).field, "");
        // Only the single leading root name is stripped.
        assert_eq!(root_relative(ValidationIssue::new("data.data.x", "m")).field, "data.x");
        assert_eq!(root_relative(ValidationIssue::new("database", "m")).field, "database");
    }

    #[test]
    fn test_valid_and_invalid() {
        let v = validator();
        assert!(v.context(&json!({"name": "Jeff"})).valid());
        let input = json!({"name": 123});
        let ctx = v.context(&input);
        assert!(!ctx.valid());
        assert_eq!(ctx.errors[0].field, "name");
    }

    #[test]
    fn test_taking_errors_makes_context_valid() {
        let v = validator();
        let input = json!({"name": 123, "extra": 1});
        let mut ctx = v.context(&input);
        let taken = ctx.take_errors();
        assert_eq!(taken.len(), 1);
        assert!(ctx.valid());
        assert_eq!(ctx.end().unwrap(), json!({"name": 123}));
    }

    #[test]
    fn test_caller_errors_make_context_invalid() {
        let v = validator();
        let input = json!({"name": "Jeff"});
        let mut ctx = v.context(&input);
        ctx.push_error("name", "is already taken");
        assert!(!ctx.valid());
        let err = ctx.end().unwrap_err();
        assert_eq!(err.errors, vec![ValidationIssue::new("name", "is already taken")]);
    }

    #[test]
    fn test_pick_ignores_validity() {
        let v = validator();
        let input = json!({"name": 123, "nonexistentProp": 1});
        let ctx = v.context(&input);
        assert!(!ctx.valid());
        assert_eq!(ctx.pick(), json!({"name": 123}));
        assert_eq!(ctx.input(), &input);
    }

    #[test]
    fn test_end_or_none() {
        let v = validator();
        assert_eq!(v.context(&json!({"name": 123})).end_or_none(), None);
        assert_eq!(
            v.context(&json!({"name": "ok", "x": 1})).end_or_none(),
            Some(json!({"name": "ok"}))
        );
    }

    #[test]
    fn test_outcome() {
        let v = validator();
        let outcome = v.context(&json!({"age": "old"})).into_outcome();
        assert!(!outcome.is_valid());
        match outcome {
            Outcome::Invalid(errors) => assert_eq!(errors[0].field, "age"),
            Outcome::Valid(value) => panic!("expected Invalid, got {value}"),
        }
        let outcome = v.context(&json!({"age": 3})).into_outcome();
        assert_eq!(outcome, Outcome::Valid(json!({"age": 3})));
    }

    #[test]
    fn test_non_greedy_context() {
        let v = Validator::with_options(
            &json!({"type": "object", "required": ["a", "b"]}),
            ValidatorOptions {
                greedy: false,
                ..ValidatorOptions::default()
            },
        )
        .unwrap();
        assert_eq!(v.context(&json!({})).errors.len(), 1);
    }
}
