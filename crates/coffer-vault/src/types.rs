//! # Type Tags
//!
//! The type vocabulary of vault rules. Tags are written as short names
//! (`"string"`, `"int"`, `"mapping"`) and may be suffixed with `[]` to
//! require a list whose every element matches the inner tag
//! (`"string[]"`, `"int[][]"`).
//!
//! `array` is the loose container tag: it accepts both mappings and lists.
//! Use `mapping` or `list` to require one shape.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

/// An accepted value type in a [`RuleSet`](crate::RuleSet).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Bool,
    /// Integral numbers only.
    Int,
    /// Numbers with a fractional representation (`1.0`, `99.99`).
    Float,
    /// Any number, or a string that parses as one.
    Numeric,
    String,
    /// Mapping or list.
    Array,
    Mapping,
    List,
    /// Anything, including null.
    Mixed,
    /// A list whose elements all match the inner tag.
    ListOf(Box<TypeTag>),
}

/// A type name that is not part of the tag vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type tag {0:?}")]
pub struct UnknownTypeTag(pub String);

impl TypeTag {
    /// Returns true if `value` is accepted by this tag.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Null => value.is_null(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_f64(),
            Self::Numeric => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            Self::String => value.is_string(),
            Self::Array => value.is_object() || value.is_array(),
            Self::Mapping => value.is_object(),
            Self::List => value.is_array(),
            Self::Mixed => true,
            Self::ListOf(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| inner.matches(item))),
        }
    }

    /// Returns true if any tag in `tags` accepts `value`. An empty slice
    /// accepts everything.
    pub fn any_matches(tags: &[TypeTag], value: &Value) -> bool {
        tags.is_empty() || tags.iter().any(|tag| tag.matches(value))
    }
}

/// The vault's name for the type of `value`, as used in error messages.
pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return Ok(Self::ListOf(Box::new(inner.parse()?)));
        }
        match name {
            "null" => Ok(Self::Null),
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" | "double" => Ok(Self::Float),
            "numeric" | "number" => Ok(Self::Numeric),
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "mapping" | "map" | "object" => Ok(Self::Mapping),
            "list" => Ok(Self::List),
            "mixed" => Ok(Self::Mixed),
            _ => Err(UnknownTypeTag(s.to_string())),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Array => "array",
            Self::Mapping => "mapping",
            Self::List => "list",
            Self::Mixed => "mixed",
            Self::ListOf(inner) => return write!(f, "{inner}[]"),
        };
        f.write_str(name)
    }
}
