//! # Option Schemas
//!
//! An [`OptionSchema`] is an ordered table of `(key, RuleSet)` entries plus
//! an explicit undefined-key policy. Declaration order decides which failure
//! is reported first and the key order of the resolved output.
//!
//! Schemas can be built in code or parsed from a JSON/YAML value whose rule
//! entries use the keys `types`, `required`, `choices`, `default`,
//! `normalizer`, `schema` and `allow_undefined_keys`. Normalizers are named
//! and looked up in a [`NormalizerRegistry`]:
//!
//! ```
//! use coffer_vault::{NormalizerRegistry, OptionSchema};
//! use serde_json::json;
//!
//! let schema = OptionSchema::from_value(
//!     &json!({
//!         "price": {"types": ["float", "string"], "normalizer": "float"},
//!         "status": {"required": true, "choices": ["active", "inactive"]},
//!     }),
//!     &NormalizerRegistry::default(),
//! ).unwrap();
//! assert_eq!(schema.keys().collect::<Vec<_>>(), ["price", "status"]);
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::VaultError;
use crate::rule::{builtin, Normalizer, RuleSet};
use crate::types::TypeTag;

/// Ordered rule table for a vault level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSchema {
    rules: Vec<(String, RuleSet)>,
    allow_undefined_keys: Option<bool>,
}

impl OptionSchema {
    /// An empty schema: resolution passes data through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for `key`. A replaced rule keeps its position.
    pub fn rule(mut self, key: impl Into<String>, rule: RuleSet) -> Self {
        self.insert(key, rule);
        self
    }

    /// Set the undefined-key policy for this level. It overrides whatever the
    /// caller passes to resolution and is inherited by nested schemas that do
    /// not set their own.
    pub fn allow_undefined_keys(mut self, allow: bool) -> Self {
        self.allow_undefined_keys = Some(allow);
        self
    }

    /// Add or replace the rule for `key` in place.
    pub fn insert(&mut self, key: impl Into<String>, rule: RuleSet) -> &mut Self {
        let key = key.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = rule,
            None => self.rules.push((key, rule)),
        }
        self
    }

    /// The explicit undefined-key policy, if one was set.
    pub fn undefined_key_policy(&self) -> Option<bool> {
        self.allow_undefined_keys
    }

    /// The rule declared for `key`.
    pub fn get(&self, key: &str) -> Option<&RuleSet> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, rule)| rule)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.rules.iter().map(|(key, rule)| (key.as_str(), rule))
    }

    /// Declared keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules and no explicit undefined-key policy.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.allow_undefined_keys.is_none()
    }

    /// Parse a declarative schema: a mapping of key to rule mapping.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::MalformedSchema` naming the dotted path of the
    /// first rule that is not a mapping, has an unknown or mistyped field,
    /// an unknown type tag, or an unregistered normalizer.
    pub fn from_value(value: &Value, registry: &NormalizerRegistry) -> Result<Self, VaultError> {
        parse_schema(value, registry, "")
    }

    /// Parse a declarative schema from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::MalformedSchema` at the root when the text is not
    /// valid YAML, otherwise as for [`OptionSchema::from_value`].
    pub fn from_yaml_str(text: &str, registry: &NormalizerRegistry) -> Result<Self, VaultError> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| VaultError::malformed("", e.to_string()))?;
        Self::from_value(&value, registry)
    }
}

impl<K: Into<String>> FromIterator<(K, RuleSet)> for OptionSchema {
    fn from_iter<I: IntoIterator<Item = (K, RuleSet)>>(iter: I) -> Self {
        let mut schema = Self::new();
        for (key, rule) in iter {
            schema.insert(key, rule);
        }
        schema
    }
}

/// Named normalizers available to declarative schemas.
#[derive(Debug, Clone)]
pub struct NormalizerRegistry {
    entries: BTreeMap<String, Normalizer>,
}

impl NormalizerRegistry {
    /// A registry with no normalizers.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register `normalizer` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, normalizer: Normalizer) -> &mut Self {
        self.entries.insert(name.into(), normalizer);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Normalizer> {
        self.entries.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for NormalizerRegistry {
    /// The built-ins: `float`, `int`, `string`, `bool`, `trim`, `lowercase`
    /// and `uppercase`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("float", builtin::float())
            .register("int", builtin::int())
            .register("string", builtin::string())
            .register("bool", builtin::bool())
            .register("trim", builtin::trim())
            .register("lowercase", builtin::lowercase())
            .register("uppercase", builtin::uppercase());
        registry
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn parse_schema(value: &Value, registry: &NormalizerRegistry, prefix: &str) -> Result<OptionSchema, VaultError> {
    let Value::Object(entries) = value else {
        return Err(VaultError::malformed(prefix, "schema must be a mapping"));
    };
    let mut schema = OptionSchema::new();
    for (key, rule) in entries {
        let path = join_path(prefix, key);
        let Value::Object(fields) = rule else {
            return Err(VaultError::malformed(path, "rule must be a mapping"));
        };
        schema.insert(key.clone(), parse_rule(fields, registry, &path)?);
    }
    Ok(schema)
}

fn parse_rule(fields: &Map<String, Value>, registry: &NormalizerRegistry, path: &str) -> Result<RuleSet, VaultError> {
    let mut rule = RuleSet::new();
    let mut nested_policy = None;

    for (field, value) in fields {
        match field.as_str() {
            "types" => rule.types = parse_types(value, path)?,
            "required" => rule.required = expect_bool(value, path, field)?,
            "choices" => match value {
                Value::Array(choices) => rule.choices = choices.clone(),
                _ => return Err(VaultError::malformed(path, "choices must be a list")),
            },
            "default" => rule.default = Some(value.clone()),
            "normalizer" => {
                let Value::String(name) = value else {
                    return Err(VaultError::malformed(path, "normalizer must be a name"));
                };
                let normalizer = registry
                    .get(name)
                    .ok_or_else(|| VaultError::malformed(path, format!("unknown normalizer {name:?}")))?;
                rule.normalizer = Some(normalizer.clone());
            }
            "schema" => rule.schema = Some(parse_schema(value, registry, path)?),
            "allow_undefined_keys" => nested_policy = Some(expect_bool(value, path, field)?),
            other => return Err(VaultError::malformed(path, format!("unknown rule field {other:?}"))),
        }
    }

    if let Some(allow) = nested_policy {
        let nested = rule
            .schema
            .take()
            .ok_or_else(|| VaultError::malformed(path, "allow_undefined_keys requires a nested schema"))?;
        rule.schema = Some(nested.allow_undefined_keys(allow));
    }
    Ok(rule)
}

fn parse_types(value: &Value, path: &str) -> Result<Vec<TypeTag>, VaultError> {
    let parse = |name: &Value| match name {
        Value::String(name) => name
            .parse::<TypeTag>()
            .map_err(|e| VaultError::malformed(path, e.to_string())),
        _ => Err(VaultError::malformed(path, "type tags must be strings")),
    };
    match value {
        Value::Array(names) => names.iter().map(parse).collect(),
        single => Ok(vec![parse(single)?]),
    }
}

fn expect_bool(value: &Value, path: &str, field: &str) -> Result<bool, VaultError> {
    value
        .as_bool()
        .ok_or_else(|| VaultError::malformed(path, format!("{field} must be a boolean")))
}
