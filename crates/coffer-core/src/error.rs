//! # Error Types
//!
//! Errors raised by the container plumbing itself. The validating
//! containers in `coffer-schema` and `coffer-vault` define their own error
//! enums and wrap [`CofferError`] for input conversion failures.

use thiserror::Error;

/// Top-level error type for the container primitives.
#[derive(Error, Debug)]
pub enum CofferError {
    /// A value that cannot be used as container data was supplied where a
    /// mapping (or a list, for journals) was required.
    #[error("invalid input: expected {expected}, found {found}")]
    InvalidInput {
        /// The shape the container needed.
        expected: &'static str,
        /// The JSON type actually supplied.
        found: &'static str,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CofferError {
    /// Build an `InvalidInput` error for a value that should have been a mapping.
    pub fn expected_mapping(found: &serde_json::Value) -> Self {
        Self::InvalidInput {
            expected: "mapping",
            found: crate::value::json_type_name(found),
        }
    }
}
