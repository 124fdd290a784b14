//! # Store Errors
//!
//! Validation failures carry every violation the validator reported, each
//! with the JSON Pointer of the offending value. The rendered message lists
//! them as `"<message> in <pointer>."`, space separated, so a single line
//! describes everything wrong with the data.

use std::fmt;

use coffer_core::CofferError;
use thiserror::Error;

/// Error raised by [`Store`](crate::Store) and the resolution functions.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The data did not conform to the schema.
    #[error("data failed schema validation. {violations}")]
    Validation {
        /// Every violation found, in validator order.
        violations: ValidationViolations,
    },

    /// The schema document is malformed or could not be compiled.
    #[error("invalid schema: {reason}")]
    InvalidSchema {
        /// Why the schema was rejected.
        reason: String,
    },

    /// Schema text could not be parsed as JSON or YAML.
    #[error("schema load error: {reason}")]
    SchemaLoad {
        /// Parser error description.
        reason: String,
    },

    /// The data could not be used as container input.
    #[error(transparent)]
    Input(#[from] CofferError),
}

impl StoreError {
    /// Shortcut for an `InvalidSchema` error.
    pub(crate) fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            reason: reason.into(),
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the data.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// The instance pointer, with the document root rendered as `/`.
    pub fn pointer(&self) -> &str {
        if self.instance_path.is_empty() {
            "/"
        } else {
            &self.instance_path
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}.", self.message, self.pointer())
    }
}

impl From<jsonschema::ValidationError<'_>> for Violation {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        Self {
            instance_path: error.instance_path.to_string(),
            schema_path: error.schema_path.to_string(),
            message: error.to_string(),
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
