//! # Resolution
//!
//! Turns raw data into schema-conforming data in two passes:
//!
//! 1. **Default injection**, top-down over `properties`: a key missing from
//!    the data receives the declared `default`. When the property is an
//!    object schema with its own `properties` and the value is a mapping,
//!    injection continues inside it.
//! 2. **Validation** of the defaulted copy against the compiled schema. All
//!    violations are collected, not just the first.
//!
//! A schema without root `properties` skips both passes, so the data is
//! returned untouched even if the schema has other keywords such as
//! `required`.

use coffer_core::CofferError;
use serde_json::{Map, Value};

use crate::document::{PropertyNode, SchemaDocument};
use crate::error::{StoreError, ValidationViolations, Violation};

/// Inject declared defaults into `data`, recursing into nested object schemas.
///
/// Keys already present are never overwritten, including explicit `null`s.
pub fn apply_defaults(data: &mut Map<String, Value>, properties: &[(String, PropertyNode)]) {
    for (key, node) in properties {
        if !data.contains_key(key) {
            if let Some(default) = node.default_value() {
                tracing::trace!(key = key.as_str(), "injecting schema default");
                data.insert(key.clone(), default.clone());
            }
        }

        if !node.is_object() {
            continue;
        }
        if let (Some(nested), Some(Value::Object(child))) = (node.properties(), data.get_mut(key)) {
            apply_defaults(child, nested);
        }
    }
}

/// Apply defaults and validate `data` against `schema`.
///
/// # Errors
///
/// Returns `StoreError::Validation` listing every violation when the
/// defaulted data does not conform.
pub fn resolve(mut data: Map<String, Value>, schema: &SchemaDocument) -> Result<Map<String, Value>, StoreError> {
    let Some(properties) = schema.properties() else {
        tracing::trace!("schema declares no properties; data passes through");
        return Ok(data);
    };

    apply_defaults(&mut data, properties);

    let instance = Value::Object(data);
    let violations: Vec<Violation> = schema
        .validator()
        .iter_errors(&instance)
        .map(Violation::from)
        .collect();

    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "schema validation failed");
        return Err(StoreError::Validation {
            violations: ValidationViolations::new(violations),
        });
    }

    match instance {
        Value::Object(map) => Ok(map),
        other => Err(CofferError::expected_mapping(&other).into()),
    }
}
