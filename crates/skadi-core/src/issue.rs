//! # Validation Issues
//!
//! A [`ValidationIssue`] is the unit of failure reported by a validation run.
//! The `field` is a dotted path relative to the validated document
//! (`"notes.0.title"`), with the empty string denoting the document itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Dotted path to the violating field, relative to the document root.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// The offending value. Only populated in verbose mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// JSON Pointer into the schema keyword that failed. Only populated in
    /// verbose mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
}

impl ValidationIssue {
    /// Create an issue with only a field and a message, the shape callers
    /// use when appending their own errors to a context.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
            schema_path: None,
        }
    }

    /// Returns true if the issue refers to the document itself.
    pub fn is_root(&self) -> bool {
        self.field.is_empty()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.field, self.message)
        }
    }
}
