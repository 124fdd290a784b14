//! # Rules
//!
//! A [`RuleSet`] is the per-key configuration of an option schema: accepted
//! types, the required flag, allowed choices, a default, and either a
//! [`Normalizer`] or a nested [`OptionSchema`].
//!
//! Rules are built fluently:
//!
//! ```
//! use coffer_vault::{RuleSet, TypeTag};
//! use serde_json::json;
//!
//! let status = RuleSet::new()
//!     .types([TypeTag::String])
//!     .required()
//!     .choices([json!("active"), json!("inactive")]);
//! assert!(status.required);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use crate::schema::OptionSchema;
use crate::types::{type_of, TypeTag};

type NormalizerFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;

/// A shared value transformation applied after type and choice checks.
///
/// Cloning is cheap; clones share the same function and compare equal.
#[derive(Clone)]
pub struct Normalizer {
    name: Option<String>,
    func: Arc<NormalizerFn>,
}

impl Normalizer {
    /// Wrap an anonymous function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    /// Wrap a function under a name, shown in `Debug` output.
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            func: Arc::new(func),
        }
    }

    /// The registered name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run the normalizer.
    ///
    /// # Errors
    ///
    /// Returns the normalizer's own message when it rejects the value.
    pub fn apply(&self, value: Value) -> Result<Value, String> {
        (self.func)(value)
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Normalizer({name})"),
            None => f.write_str("Normalizer(<fn>)"),
        }
    }
}

impl PartialEq for Normalizer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Per-key rules of an [`OptionSchema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    /// Accepted types. Empty accepts any value.
    pub types: Vec<TypeTag>,
    /// Whether the key must resolve to a value.
    pub required: bool,
    /// Allowed values. Empty allows any value.
    pub choices: Vec<Value>,
    /// Fallback when the input omits the key. `Some(Value::Null)` is a real
    /// default.
    pub default: Option<Value>,
    /// Transformation applied last. Ignored when `schema` is set.
    pub normalizer: Option<Normalizer>,
    /// Rules for a nested mapping.
    pub schema: Option<OptionSchema>,
}

impl RuleSet {
    /// A rule that accepts any value and is optional.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the accepted types.
    pub fn types(mut self, types: impl IntoIterator<Item = TypeTag>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Mark the key as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Replace the allowed values.
    pub fn choices(mut self, choices: impl IntoIterator<Item = Value>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the normalizer.
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Set a nested schema for mapping values.
    pub fn schema(mut self, schema: OptionSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The nested schema, when it has any effect. An empty nested schema is
    /// treated as absent.
    pub fn nested(&self) -> Option<&OptionSchema> {
        self.schema.as_ref().filter(|schema| !schema.is_empty())
    }

    /// Types checked at resolution time. A nested schema forces `mapping`.
    pub fn effective_types(&self) -> &[TypeTag] {
        const MAPPING: &[TypeTag] = &[TypeTag::Mapping];
        if self.nested().is_some() {
            MAPPING
        } else {
            &self.types
        }
    }

    /// Default used at resolution time. A nested schema forces `{}`.
    pub fn effective_default(&self) -> Option<Value> {
        if self.nested().is_some() {
            Some(Value::Object(Map::new()))
        } else {
            self.default.clone()
        }
    }

    /// Returns true if the key can resolve without an input value.
    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.nested().is_some()
    }
}

/// Built-in normalizers, registered by name in the default
/// [`NormalizerRegistry`](crate::NormalizerRegistry).
pub mod builtin {
    use super::*;

    /// Convert numbers, numeric strings, booleans and null to a float.
    pub fn float() -> Normalizer {
        Normalizer::named("float", |value| {
            let number = match &value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                Value::Null => Some(0.0),
                _ => None,
            };
            number
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("cannot convert {} {value} to float", type_of(&value)))
        })
    }

    /// Convert numbers, numeric strings, booleans and null to an integer.
    /// Fractions are truncated.
    pub fn int() -> Normalizer {
        Normalizer::named("int", |value| {
            let number = match &value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
                Value::String(s) => {
                    let s = s.trim();
                    s.parse::<i64>()
                        .ok()
                        .or_else(|| s.parse::<f64>().ok().and_then(truncate))
                }
                Value::Bool(b) => Some(i64::from(*b)),
                Value::Null => Some(0),
                _ => None,
            };
            number
                .map(Value::from)
                .ok_or_else(|| format!("cannot convert {} {value} to int", type_of(&value)))
        })
    }

    fn truncate(f: f64) -> Option<i64> {
        // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
        (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
    }

    /// Render scalars as strings. Null becomes `""`.
    pub fn string() -> Normalizer {
        Normalizer::named("string", |value| match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Null => Ok(Value::String(String::new())),
            other => Err(format!("cannot convert {} to string", type_of(&other))),
        })
    }

    /// Interpret booleans, numbers and common boolean words.
    pub fn bool() -> Normalizer {
        Normalizer::named("bool", |value| {
            let flag = match &value {
                Value::Bool(b) => Some(*b),
                Value::Null => Some(false),
                Value::Number(n) => n.as_f64().map(|f| f != 0.0),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Some(true),
                    "" | "0" | "false" | "no" | "off" => Some(false),
                    _ => None,
                },
                _ => None,
            };
            flag.map(Value::Bool)
                .ok_or_else(|| format!("cannot convert {} {value} to bool", type_of(&value)))
        })
    }

    /// Strip surrounding whitespace from strings.
    pub fn trim() -> Normalizer {
        string_op("trim", |s| s.trim().to_string())
    }

    /// Lowercase strings.
    pub fn lowercase() -> Normalizer {
        string_op("lowercase", str::to_lowercase)
    }

    /// Uppercase strings.
    pub fn uppercase() -> Normalizer {
        string_op("uppercase", str::to_uppercase)
    }

    fn string_op(name: &'static str, op: fn(&str) -> String) -> Normalizer {
        Normalizer::named(name, move |value| match value {
            Value::String(s) => Ok(Value::String(op(&s))),
            other => Err(format!("{name} expects a string, got {}", type_of(&other))),
        })
    }
}
