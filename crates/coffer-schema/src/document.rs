//! # Schema Documents
//!
//! A [`SchemaDocument`] is a JSON Schema (draft 2020-12) parsed once when it
//! is set on a store. Parsing does three things:
//!
//! 1. Normalizes the root: `$schema` and `type: "object"` are inserted ahead
//!    of the caller's keywords unless the caller provides them.
//! 2. Extracts the `properties` tree (types, defaults, nested properties)
//!    that drives default injection.
//! 3. Compiles the document with the `jsonschema` crate.
//!
//! Malformed documents fail here, not halfway through a resolution.
//!
//! ## Legacy Bounds
//!
//! Older schemas write exclusive bounds the draft-4 way:
//! `{"minimum": 0, "exclusiveMinimum": true}`. Draft 2020-12 requires a
//! number there, so the compiled copy rewrites it to `{"exclusiveMinimum": 0}`
//! (and drops `exclusiveMinimum: false`). The document returned by
//! [`SchemaDocument::as_value`] is left as written.

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::config::StoreOptions;
use crate::error::StoreError;

/// Dialect identifier injected as `$schema` at the root of every document.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Keywords whose value is a single subschema (or, for `items`, a list of them).
const SUBSCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "additionalItems",
    "additionalProperties",
    "contains",
    "else",
    "if",
    "not",
    "propertyNames",
    "then",
    "unevaluatedItems",
    "unevaluatedProperties",
];

/// Keywords whose value is a list of subschemas.
const SUBSCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// Keywords whose value maps names to subschemas.
const SUBSCHEMA_MAP_KEYWORDS: &[&str] = &[
    "$defs",
    "definitions",
    "dependentSchemas",
    "patternProperties",
    "properties",
];

/// One entry of a `properties` map, reduced to what default injection needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyNode {
    kind: Option<String>,
    default: Option<Value>,
    properties: Option<Vec<(String, PropertyNode)>>,
}

impl PropertyNode {
    fn parse(schema: &Value, pointer: &str) -> Result<Self, StoreError> {
        let map = match schema {
            Value::Object(map) => map,
            // Boolean schemas are valid property schemas with nothing to inject.
            Value::Bool(_) => return Ok(Self::default()),
            other => {
                return Err(StoreError::invalid_schema(format!(
                    "schema at {pointer} must be a mapping or a boolean, found {}",
                    coffer_core::json_type_name(other)
                )))
            }
        };

        let properties = map
            .get("properties")
            .map(|p| parse_properties(p, &format!("{pointer}/properties")))
            .transpose()?;

        Ok(Self {
            kind: map.get("type").and_then(Value::as_str).map(str::to_owned),
            default: map.get("default").cloned(),
            properties,
        })
    }

    /// The declared `type`, when it is a single type name.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Whether this node is an object schema that nested defaults descend into.
    pub fn is_object(&self) -> bool {
        self.kind() == Some("object")
    }

    /// The declared `default`, if any (an explicit `null` counts).
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Nested `properties`, in declaration order.
    pub fn properties(&self) -> Option<&[(String, PropertyNode)]> {
        self.properties.as_deref()
    }
}

fn parse_properties(value: &Value, pointer: &str) -> Result<Vec<(String, PropertyNode)>, StoreError> {
    let Value::Object(map) = value else {
        return Err(StoreError::invalid_schema(format!(
            "`properties` at {pointer} must be a mapping"
        )));
    };
    map.iter()
        .map(|(name, node)| -> Result<_, StoreError> {
            let parsed = PropertyNode::parse(node, &format!("{pointer}/{name}"))?;
            Ok((name.clone(), parsed))
        })
        .collect()
}

/// A parsed and compiled JSON Schema document.
#[derive(Clone)]
pub struct SchemaDocument {
    raw: Value,
    properties: Option<Vec<(String, PropertyNode)>>,
    options: StoreOptions,
    validator: Arc<Validator>,
}

impl SchemaDocument {
    /// Parse and compile a schema with default [`StoreOptions`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidSchema` if the document is not a mapping,
    /// has a malformed `properties` tree, or fails to compile.
    pub fn new(schema: Value) -> Result<Self, StoreError> {
        Self::with_options(schema, &StoreOptions::default())
    }

    /// Parse and compile a schema with explicit options.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaDocument::new`].
    pub fn with_options(schema: Value, options: &StoreOptions) -> Result<Self, StoreError> {
        let Value::Object(caller) = schema else {
            return Err(StoreError::invalid_schema(format!(
                "schema root must be a mapping, found {}",
                coffer_core::json_type_name(&schema)
            )));
        };

        let mut root = Map::new();
        root.insert("$schema".to_string(), Value::String(SCHEMA_DIALECT.to_string()));
        root.insert("type".to_string(), Value::String("object".to_string()));
        root.extend(caller);
        let raw = Value::Object(root);

        let properties = raw
            .get("properties")
            .map(|p| parse_properties(p, "/properties"))
            .transpose()?;

        let validator = compile(&raw, options)?;

        Ok(Self {
            raw,
            properties,
            options: *options,
            validator: Arc::new(validator),
        })
    }

    /// Parse a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaLoad` for invalid JSON, otherwise the
    /// errors of [`SchemaDocument::with_options`].
    pub fn from_json_str(text: &str, options: &StoreOptions) -> Result<Self, StoreError> {
        let value: Value = serde_json::from_str(text).map_err(|e| StoreError::SchemaLoad {
            reason: format!("invalid JSON: {e}"),
        })?;
        Self::with_options(value, options)
    }

    /// Parse a schema from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaLoad` for invalid YAML or YAML that has no
    /// JSON equivalent, otherwise the errors of [`SchemaDocument::with_options`].
    pub fn from_yaml_str(text: &str, options: &StoreOptions) -> Result<Self, StoreError> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| StoreError::SchemaLoad {
            reason: format!("invalid YAML: {e}"),
        })?;
        Self::with_options(value, options)
    }

    /// The document as set, including the injected root keywords.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Root `properties`, in declaration order. `None` disables resolution.
    pub fn properties(&self) -> Option<&[(String, PropertyNode)]> {
        self.properties.as_deref()
    }

    /// The options the document was compiled with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The compiled validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl fmt::Debug for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDocument")
            .field("raw", &self.raw)
            .field("properties", &self.properties)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SchemaDocument {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

fn compile(raw: &Value, options: &StoreOptions) -> Result<Validator, StoreError> {
    let source = if options.upgrade_legacy_bounds {
        let mut upgraded = raw.clone();
        upgrade_legacy_bounds(&mut upgraded);
        upgraded
    } else {
        raw.clone()
    };

    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .should_validate_formats(options.validate_formats)
        .build(&source)
        .map_err(|e| {
            tracing::warn!(error = %e, "schema failed to compile");
            StoreError::invalid_schema(e.to_string())
        })
}

/// Rewrite draft-4 boolean exclusive bounds, walking only subschema positions.
fn upgrade_legacy_bounds(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    upgrade_bound(map, "minimum", "exclusiveMinimum");
    upgrade_bound(map, "maximum", "exclusiveMaximum");

    for (keyword, child) in map.iter_mut() {
        let keyword = keyword.as_str();
        if SUBSCHEMA_KEYWORDS.contains(&keyword) || SUBSCHEMA_LIST_KEYWORDS.contains(&keyword) {
            match child {
                Value::Array(items) => items.iter_mut().for_each(upgrade_legacy_bounds),
                other => upgrade_legacy_bounds(other),
            }
        } else if SUBSCHEMA_MAP_KEYWORDS.contains(&keyword) {
            if let Value::Object(named) = child {
                named.values_mut().for_each(upgrade_legacy_bounds);
            }
        }
    }
}

fn upgrade_bound(map: &mut Map<String, Value>, inclusive: &str, exclusive: &str) {
    let Some(Value::Bool(flag)) = map.get(exclusive) else {
        return;
    };
    let flag = *flag;
    map.shift_remove(exclusive);
    if flag {
        if let Some(bound) = map.shift_remove(inclusive) {
            map.insert(exclusive.to_string(), bound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_fields_injected_first() {
        let doc = SchemaDocument::new(json!({
            "required": ["foo"],
            "properties": {"foo": {"type": "string"}},
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_string(doc.as_value()).unwrap(),
            r#"{"$schema":"https://json-schema.org/draft/2020-12/schema","type":"object","required":["foo"],"properties":{"foo":{"type":"string"}}}"#
        );
    }

    #[test]
    fn test_caller_type_overrides_injected_type() {
        let doc = SchemaDocument::new(json!({"type": ["object", "null"]})).unwrap();
        assert_eq!(doc.as_value()["type"], json!(["object", "null"]));
        assert!(doc.properties().is_none());
    }

    #[test]
    fn test_property_tree_parsed_in_order() {
        let doc = SchemaDocument::new(json!({
            "properties": {
                "user": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "email": {"type": "string", "default": "a@b.c"},
                    },
                },
                "flag": true,
            },
        }))
        .unwrap();

        let props = doc.properties().unwrap();
        assert_eq!(props[0].0, "user");
        assert_eq!(props[1].0, "flag");
        assert!(props[0].1.is_object());

        let nested = props[0].1.properties().unwrap();
        assert_eq!(nested[1].0, "email");
        assert_eq!(nested[1].1.default_value(), Some(&json!("a@b.c")));
        assert_eq!(props[1].1, PropertyNode::default());
    }

    #[test]
    fn test_rejects_non_mapping_root() {
        let err = SchemaDocument::new(json!(["not", "a", "schema"])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSchema { .. }));
    }

    #[test]
    fn test_rejects_malformed_properties() {
        let err = SchemaDocument::new(json!({"properties": ["name"]})).unwrap_err();
        assert!(
            err.to_string().contains("/properties"),
            "unexpected message: {err}"
        );

        let err = SchemaDocument::new(json!({"properties": {"name": "string"}})).unwrap_err();
        assert!(
            err.to_string().contains("/properties/name"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn test_rejects_uncompilable_schema() {
        let err = SchemaDocument::new(json!({"minLength": "three"})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSchema { .. }));
    }

    #[test]
    fn test_upgrade_legacy_exclusive_minimum() {
        let mut schema = json!({
            "properties": {
                "price": {"type": "number", "minimum": 0, "exclusiveMinimum": true},
                "qty": {"type": "integer", "maximum": 9, "exclusiveMaximum": false},
            },
        });
        upgrade_legacy_bounds(&mut schema);
        assert_eq!(
            schema,
            json!({
                "properties": {
                    "price": {"type": "number", "exclusiveMinimum": 0},
                    "qty": {"type": "integer", "maximum": 9},
                },
            })
        );
    }

    #[test]
    fn test_upgrade_leaves_property_names_alone() {
        let mut schema = json!({
            "properties": {"exclusiveMinimum": true, "minimum": {"type": "number"}},
        });
        let before = schema.clone();
        upgrade_legacy_bounds(&mut schema);
        assert_eq!(schema, before);
    }

    #[test]
    fn test_upgrade_walks_combinators_and_items() {
        let mut schema = json!({
            "anyOf": [{"minimum": 1, "exclusiveMinimum": true}],
            "items": {"maximum": 5, "exclusiveMaximum": true},
        });
        upgrade_legacy_bounds(&mut schema);
        assert_eq!(
            schema,
            json!({
                "anyOf": [{"exclusiveMinimum": 1}],
                "items": {"exclusiveMaximum": 5},
            })
        );
    }

    #[test]
    fn test_legacy_bounds_compile_only_when_upgraded() {
        let schema = json!({
            "properties": {"price": {"type": "number", "minimum": 0, "exclusiveMinimum": true}},
        });
        assert!(SchemaDocument::new(schema.clone()).is_ok());

        let options = StoreOptions {
            upgrade_legacy_bounds: false,
            ..StoreOptions::default()
        };
        assert!(SchemaDocument::with_options(schema.clone(), &options).is_err());

        // The document as set keeps the legacy spelling.
        let doc = SchemaDocument::new(schema).unwrap();
        assert_eq!(doc.as_value()["properties"]["price"]["exclusiveMinimum"], json!(true));
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
required: [name]
properties:
  name:
    type: string
  age:
    type: integer
    default: 18
"#;
        let doc = SchemaDocument::from_yaml_str(yaml, &StoreOptions::default()).unwrap();
        let props = doc.properties().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[1].1.default_value(), Some(&json!(18)));
    }

    #[test]
    fn test_from_json_str_reports_parse_errors() {
        let err = SchemaDocument::from_json_str("{not json", &StoreOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::SchemaLoad { .. }));
    }

    #[test]
    fn test_from_yaml_str_reports_parse_errors() {
        let err = SchemaDocument::from_yaml_str("properties: [unclosed", &StoreOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::SchemaLoad { .. }));
    }

    #[test]
    fn test_document_remembers_options() {
        let options = StoreOptions {
            validate_formats: false,
            ..StoreOptions::default()
        };
        let doc = SchemaDocument::with_options(json!({}), &options).unwrap();
        assert_eq!(doc.options(), &options);
        assert_eq!(SchemaDocument::new(json!({})).unwrap().options(), &StoreOptions::default());
    }
}
