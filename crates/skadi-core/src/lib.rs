//! # skadi-core — Foundational Types for Skadi
//!
//! This crate is the leaf of the Skadi workspace. It defines the types that
//! flow between the schema crate and the validator crate:
//!
//! - [`ValidationIssue`]: one `{field, message}` failure, keyed by a
//!   root-relative dotted path, optionally carrying verbose detail.
//! - [`ValidationError`]: the failure raised when a validated input is
//!   invalid. Carries the full, ordered issue list.
//! - [`SchemaError`], [`ConfigError`] and the top-level [`SkadiError`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `skadi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod issue;

pub use error::{ConfigError, SchemaError, SkadiError, ValidationError};
pub use issue::ValidationIssue;

/// The keyword whose literal `false` value marks a closed object shape.
pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// The key the normalizer moves `additionalProperties: false` to, so the
/// constraint engine stops enforcing it and only the picker sees it.
pub const DEFAULT_MARKER: &str = "_additionalProperties";
