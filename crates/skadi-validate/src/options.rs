//! # Validator Options
//!
//! Plain serde struct, loadable from JSON or YAML, validated when a
//! [`Validator`](crate::Validator) is built. The error factory is not part
//! of this struct because it is code, not configuration; pass it to
//! [`Validator::with_error_factory`](crate::Validator::with_error_factory).

use serde::{Deserialize, Serialize};

use skadi_core::{ConfigError, ADDITIONAL_PROPERTIES, DEFAULT_MARKER};

/// JSON Schema draft the constraint engine validates against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaDraft {
    #[default]
    #[serde(rename = "draft4")]
    Draft4,
    #[serde(rename = "draft6")]
    Draft6,
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl SchemaDraft {
    pub(crate) fn engine_draft(self) -> jsonschema::Draft {
        match self {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Options for [`Validator`](crate::Validator) construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Collect every violation (`true`) or stop at the first (`false`).
    pub greedy: bool,
    /// Attach the offending value and schema path to each issue.
    pub verbose: bool,
    /// Key that `additionalProperties: false` is moved to before the schema
    /// reaches the constraint engine.
    pub additional_properties_marker: String,
    /// Draft used by the constraint engine.
    pub draft: SchemaDraft,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            greedy: true,
            verbose: true,
            additional_properties_marker: DEFAULT_MARKER.to_string(),
            draft: SchemaDraft::default(),
        }
    }
}

impl ValidatorOptions {
    /// Parse options from a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is malformed.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse options from a YAML document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is malformed.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMarker` if the marker is empty or is
    /// `additionalProperties` itself, which would leave strictness with the
    /// constraint engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let marker = &self.additional_properties_marker;
        let reason = if marker.is_empty() {
            "marker must not be empty"
        } else if marker == ADDITIONAL_PROPERTIES {
            "marker must differ from the keyword it replaces"
        } else {
            return Ok(());
        };
        Err(ConfigError::InvalidMarker {
            marker: marker.clone(),
            reason: reason.to_string(),
        })
    }
}
