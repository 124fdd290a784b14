//! # Vault Errors
//!
//! Resolution stops at the first failure in declaration order, so every
//! variant describes exactly one key. Keys inside nested schemas are
//! reported by their full dotted path (`user.profile.name`).

use std::fmt;

use coffer_core::CofferError;
use serde_json::Value;
use thiserror::Error;

use crate::types::TypeTag;

/// Error raised by [`Vault`](crate::Vault) and [`resolve`](crate::resolve()).
#[derive(Error, Debug)]
pub enum VaultError {
    /// A required key has neither a value nor a default.
    #[error("the required option \"{key}\" is missing")]
    MissingKey {
        /// Dotted path of the missing key.
        key: String,
    },

    /// A value failed its type, choice or normalizer rule.
    #[error("the option \"{key}\" with value {value} {reason}")]
    InvalidValue {
        /// Dotted path of the offending key.
        key: String,
        /// The value as it was before the failing rule ran.
        value: Value,
        /// Which rule rejected it.
        reason: InvalidReason,
    },

    /// The input has keys the schema does not declare and the undefined-key
    /// policy rejects them.
    #[error(
        "the option(s) {} do not exist. Defined options are: {}",
        quote_list(.keys),
        quote_list(.defined)
    )]
    UndefinedKeys {
        /// Dotted paths of the undeclared keys, in input order.
        keys: Vec<String>,
        /// Dotted paths of the declared keys at the same level.
        defined: Vec<String>,
    },

    /// A declarative schema could not be turned into rules.
    #[error("malformed schema at \"{key}\": {reason}")]
    MalformedSchema {
        /// Dotted path of the rule being parsed (empty for the root).
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The data could not be used as container input.
    #[error(transparent)]
    Input(#[from] CofferError),
}

impl VaultError {
    pub(crate) fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The dotted path of the key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingKey { key }
            | Self::InvalidValue { key, .. }
            | Self::MalformedSchema { key, .. } => Some(key),
            Self::UndefinedKeys { .. } | Self::Input(_) => None,
        }
    }
}

/// The rule that rejected a value.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    /// The value matched none of the accepted type tags.
    Type {
        /// Accepted tags, in rule order.
        expected: Vec<TypeTag>,
        /// Type of the value actually supplied.
        found: &'static str,
    },
    /// The value is not one of the allowed choices.
    Choice {
        /// The allowed values.
        allowed: Vec<Value>,
    },
    /// The normalizer returned an error.
    Normalizer {
        /// Message from the normalizer.
        message: String,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { expected, found } => {
                let expected: Vec<String> = expected.iter().map(|t| format!("\"{t}\"")).collect();
                write!(
                    f,
                    "is expected to be of type {}, but is of type \"{found}\"",
                    expected.join(" or ")
                )
            }
            Self::Choice { allowed } => {
                let allowed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                write!(f, "is invalid. Accepted values are: {}", allowed.join(", "))
            }
            Self::Normalizer { message } => write!(f, "could not be normalized: {message}"),
        }
    }
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
