//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout Skadi. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema errors surface at construction time and are fatal for that schema.
//! - Validation errors are data: an ordered list of [`ValidationIssue`]s that
//!   callers may inspect, extend, or discard before deciding to raise.
//! - Configuration errors name the offending option.

use thiserror::Error;

use crate::issue::ValidationIssue;

/// Top-level error type for Skadi.
#[derive(Error, Debug)]
pub enum SkadiError {
    /// The schema could not be prepared or compiled.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Options were rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Raised when an input does not satisfy its schema.
///
/// Carries every collected issue, in the order the constraint engine
/// reported them followed by any issues the caller appended.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("validation errors occurred:\n{}", render_issues(.errors))]
pub struct ValidationError {
    /// The ordered list of issues.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Construct the error from a list of issues.
    pub fn new(errors: Vec<ValidationIssue>) -> Self {
        Self { errors }
    }

    /// Returns a slice of all issues.
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_errors(self) -> Vec<ValidationIssue> {
        self.errors
    }
}

impl From<Vec<ValidationIssue>> for ValidationError {
    fn from(errors: Vec<ValidationIssue>) -> Self {
        Self::new(errors)
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Error while preparing or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema tree could not be converted to or from JSON.
    #[error("schema serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The constraint engine refused to compile the schema.
    #[error("validator build error: {reason}")]
    ValidatorBuild {
        /// Reason reported by the engine.
        reason: String,
    },
}

/// Error in validator or picker options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The additional-properties marker key is unusable.
    #[error("invalid additionalProperties marker '{marker}': {reason}")]
    InvalidMarker {
        /// The rejected marker key.
        marker: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An options document could not be parsed.
    #[error("cannot parse options: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            ValidationIssue::new("name", "123 is not of type \"string\""),
            ValidationIssue::new("age", "\"age\" is a required property"),
        ]);
        let display = err.to_string();
        assert!(display.starts_with("validation errors occurred:"));
        assert!(display.contains("  name: 123 is not of type"));
        assert!(display.contains("  age: \"age\" is a required property"));
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn test_validation_error_into_top_level() {
        let err: SkadiError = ValidationError::from(vec![ValidationIssue::new("a", "bad")]).into();
        assert!(matches!(err, SkadiError::Validation(_)));
        assert!(err.to_string().contains("a: bad"));
    }

    #[test]
    fn test_config_error_names_marker() {
        let err = ConfigError::InvalidMarker {
            marker: String::new(),
            reason: "marker must not be empty".to_string(),
        };
        assert!(err.to_string().contains("marker must not be empty"));
    }
}
