//! # Option Resolution
//!
//! Resolves one mapping against an [`OptionSchema`], level by level:
//!
//! 1. An empty schema returns the data unchanged.
//! 2. The schema's own undefined-key policy, if set, replaces the inherited
//!    one. Undeclared input keys are rejected unless allowed.
//! 3. The first required key (in declaration order) with neither a value
//!    nor a default fails with `MissingKey` before any value is checked.
//! 4. Each declared key takes its input value or its default, then goes
//!    through the type check, the choice check and finally the normalizer
//!    or the nested schema. Keys with neither are omitted.
//!
//! The output lists declared keys in declaration order, followed by
//! accepted undeclared keys in input order. The first failure aborts.

use serde_json::{Map, Value};

use crate::error::{InvalidReason, VaultError};
use crate::rule::RuleSet;
use crate::schema::{join_path, OptionSchema};
use crate::types::{type_of, TypeTag};

/// Resolve `data` against `schema`.
///
/// `allow_undefined_keys` applies wherever a schema level does not set its
/// own policy.
///
/// # Errors
///
/// - `VaultError::UndefinedKeys` for undeclared keys under a rejecting policy.
/// - `VaultError::MissingKey` for a required key with no value or default.
/// - `VaultError::InvalidValue` for a type, choice or normalizer failure.
///
/// Keys inside nested schemas are reported by their dotted path.
pub fn resolve(
    data: Map<String, Value>,
    schema: &OptionSchema,
    allow_undefined_keys: bool,
) -> Result<Map<String, Value>, VaultError> {
    resolve_level(data, schema, allow_undefined_keys, "")
}

fn resolve_level(
    mut data: Map<String, Value>,
    schema: &OptionSchema,
    inherited_policy: bool,
    prefix: &str,
) -> Result<Map<String, Value>, VaultError> {
    if schema.is_empty() {
        return Ok(data);
    }
    let allow_undefined = schema.undefined_key_policy().unwrap_or(inherited_policy);
    tracing::debug!(scope = prefix, rules = schema.len(), allow_undefined, "resolving options");

    if !allow_undefined {
        let undefined: Vec<String> = data
            .keys()
            .filter(|key| !schema.contains_key(key))
            .map(|key| join_path(prefix, key))
            .collect();
        if !undefined.is_empty() {
            return Err(VaultError::UndefinedKeys {
                keys: undefined,
                defined: schema.keys().map(|key| join_path(prefix, key)).collect(),
            });
        }
    }

    if let Some((key, _)) = schema
        .rules()
        .find(|(key, rule)| rule.required && !rule.has_default() && !data.contains_key(*key))
    {
        return Err(VaultError::MissingKey {
            key: join_path(prefix, key),
        });
    }

    let mut resolved = Map::new();
    for (key, rule) in schema.rules() {
        let value = match data.shift_remove(key) {
            Some(value) => value,
            None => match rule.effective_default() {
                Some(default) => default,
                None => continue,
            },
        };
        let path = join_path(prefix, key);
        tracing::trace!(key = %path, "resolving option");
        let value = apply_rule(value, rule, &path, allow_undefined)?;
        resolved.insert(key.to_string(), value);
    }

    // Only undeclared keys remain, and only if the policy accepted them.
    resolved.extend(data);
    Ok(resolved)
}

fn apply_rule(value: Value, rule: &RuleSet, path: &str, allow_undefined: bool) -> Result<Value, VaultError> {
    let types = rule.effective_types();
    if !TypeTag::any_matches(types, &value) {
        let reason = InvalidReason::Type {
            expected: types.to_vec(),
            found: type_of(&value),
        };
        return Err(invalid(path, value, reason));
    }

    if !rule.choices.is_empty() && !rule.choices.contains(&value) {
        let reason = InvalidReason::Choice {
            allowed: rule.choices.clone(),
        };
        return Err(invalid(path, value, reason));
    }

    // The type check above already forced a mapping under a nested schema.
    match (rule.nested(), &rule.normalizer, value) {
        (Some(nested), _, Value::Object(map)) => {
            resolve_level(map, nested, allow_undefined, path).map(Value::Object)
        }
        (_, Some(normalizer), value) => normalizer.apply(value.clone()).map_err(|message| {
            tracing::debug!(key = path, error = %message, "normalizer rejected value");
            invalid(path, value, InvalidReason::Normalizer { message })
        }),
        (_, None, value) => Ok(value),
    }
}

fn invalid(path: &str, value: Value, reason: InvalidReason) -> VaultError {
    VaultError::InvalidValue {
        key: path.to_string(),
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{builtin, Normalizer};
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn run(data: Value, schema: &OptionSchema) -> Result<Value, VaultError> {
        resolve(map(data), schema, false).map(Value::Object)
    }

    fn string() -> RuleSet {
        RuleSet::new().types([TypeTag::String])
    }

    #[test]
    fn test_empty_schema_passes_everything() {
        let data = json!({"foo": "bar", "n": [1]});
        assert_eq!(run(data.clone(), &OptionSchema::new()).unwrap(), data);
    }

    #[test]
    fn test_defaults_and_declaration_order() {
        let schema = OptionSchema::new()
            .rule("name", string().required())
            .rule("age", RuleSet::new().types([TypeTag::Int]).default_value(18));
        let out = run(json!({"age": 30, "name": "John"}), &schema).unwrap();
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"{"name":"John","age":30}"#);

        let out = run(json!({"name": "John"}), &schema).unwrap();
        assert_eq!(out, json!({"name": "John", "age": 18}));
    }

    #[test]
    fn test_absent_optional_key_is_omitted() {
        let schema = OptionSchema::new().rule("nick", string());
        assert_eq!(run(json!({}), &schema).unwrap(), json!({}));
    }

    #[test]
    fn test_explicit_null_default_is_kept() {
        let schema = OptionSchema::new().rule("parent", RuleSet::new().default_value(Value::Null));
        assert_eq!(run(json!({}), &schema).unwrap(), json!({"parent": null}));
    }

    #[test]
    fn test_missing_required_key() {
        let schema = OptionSchema::new()
            .rule("a", string())
            .rule("email", string().required())
            .rule("phone", string().required());
        let err = run(json!({"a": 1}), &schema).unwrap_err();
        // Missing keys are reported before the type failure on `a`.
        assert!(matches!(&err, VaultError::MissingKey { key } if key == "email"), "{err}");
    }

    #[test]
    fn test_missing_required_key_with_undefined_allowed() {
        let schema = OptionSchema::new()
            .allow_undefined_keys(true)
            .rule("email", string().required());
        let err = resolve(map(json!({"other": 1})), &schema, true).unwrap_err();
        assert!(matches!(&err, VaultError::MissingKey { key } if key == "email"), "{err}");

        let schema = OptionSchema::new().rule("email", string().required());
        let err = resolve(map(json!({"other": 1})), &schema, true).unwrap_err();
        assert!(matches!(&err, VaultError::MissingKey { key } if key == "email"), "{err}");
    }

    #[test]
    fn test_default_satisfies_required() {
        let schema = OptionSchema::new().rule("mode", string().required().default_value("fast"));
        assert_eq!(run(json!({}), &schema).unwrap(), json!({"mode": "fast"}));
    }

    #[test]
    fn test_type_checked_before_choices() {
        let schema = OptionSchema::new().rule(
            "status",
            string().choices([json!("active"), json!("inactive")]),
        );
        let err = run(json!({"status": 3}), &schema).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidValue { reason: InvalidReason::Type { .. }, .. }
        ));

        let err = run(json!({"status": "invalid"}), &schema).unwrap_err();
        let VaultError::InvalidValue { key, value, reason } = err else {
            panic!("expected invalid value");
        };
        assert_eq!(key, "status");
        assert_eq!(value, json!("invalid"));
        assert!(matches!(reason, InvalidReason::Choice { .. }));
    }

    #[test]
    fn test_defaults_are_checked_too() {
        let schema = OptionSchema::new().rule("port", RuleSet::new().types([TypeTag::Int]).default_value("80"));
        let err = run(json!({}), &schema).unwrap_err();
        assert_eq!(err.key(), Some("port"));
    }

    #[test]
    fn test_normalizer_runs_after_checks() {
        let schema = OptionSchema::new().rule(
            "price",
            RuleSet::new()
                .types([TypeTag::Float, TypeTag::String])
                .normalizer(builtin::float()),
        );
        assert_eq!(run(json!({"price": "123.45"}), &schema).unwrap(), json!({"price": 123.45}));

        let strict = OptionSchema::new().rule(
            "price",
            RuleSet::new().types([TypeTag::Float]).normalizer(builtin::float()),
        );
        let err = run(json!({"price": "123.45"}), &strict).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidValue { reason: InvalidReason::Type { found: "string", .. }, .. }
        ));
    }

    #[test]
    fn test_normalizer_failure() {
        let schema = OptionSchema::new().rule("n", RuleSet::new().normalizer(builtin::int()));
        let err = run(json!({"n": "many"}), &schema).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidValue { reason: InvalidReason::Normalizer { .. }, .. }
        ));
    }

    #[test]
    fn test_closure_normalizer() {
        let double = Normalizer::new(|v| match v.as_i64() {
            Some(n) => Ok(json!(n * 2)),
            None => Err("not an integer".to_string()),
        });
        let schema = OptionSchema::new().rule("n", RuleSet::new().normalizer(double));
        assert_eq!(run(json!({"n": 21}), &schema).unwrap(), json!({"n": 42}));
    }

    #[test]
    fn test_undefined_keys_rejected_by_default() {
        let schema = OptionSchema::new().rule("name", string());
        let err = run(json!({"name": "x", "extra": 1, "more": 2}), &schema).unwrap_err();
        let VaultError::UndefinedKeys { keys, defined } = err else {
            panic!("expected undefined keys");
        };
        assert_eq!(keys, ["extra", "more"]);
        assert_eq!(defined, ["name"]);
    }

    #[test]
    fn test_undefined_keys_appended_in_input_order() {
        let schema = OptionSchema::new().rule("name", string());
        let data = map(json!({"z": 1, "name": "x", "a": 2}));
        let out = resolve(data, &schema, true).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), ["name", "z", "a"]);
    }

    #[test]
    fn test_schema_policy_overrides_parameter() {
        let schema = OptionSchema::new().rule("name", string()).allow_undefined_keys(true);
        assert!(run(json!({"extra": 1}), &schema).is_ok());

        let strict = OptionSchema::new().rule("name", string()).allow_undefined_keys(false);
        assert!(resolve(map(json!({"extra": 1})), &strict, true).is_err());
    }

    #[test]
    fn test_policy_only_schema_is_not_empty() {
        let strict = OptionSchema::new().allow_undefined_keys(false);
        assert!(run(json!({"x": 1}), &strict).is_err());
        assert_eq!(run(json!({}), &strict).unwrap(), json!({}));
    }

    fn user_schema() -> OptionSchema {
        OptionSchema::new().rule(
            "user",
            RuleSet::new().types([TypeTag::Mapping]).schema(
                OptionSchema::new()
                    .rule("name", string().required())
                    .rule("email", string().default_value("default@example.com")),
            ),
        )
    }

    #[test]
    fn test_nested_schema_resolves_recursively() {
        let out = run(json!({"user": {"name": "John"}}), &user_schema()).unwrap();
        assert_eq!(out, json!({"user": {"name": "John", "email": "default@example.com"}}));
    }

    #[test]
    fn test_nested_default_is_resolved() {
        // The forced `{}` default goes through the nested schema, so a
        // required inner key surfaces with its dotted path.
        let err = run(json!({}), &user_schema()).unwrap_err();
        assert!(matches!(&err, VaultError::MissingKey { key } if key == "user.name"), "{err}");
    }

    #[test]
    fn test_nested_errors_use_dotted_paths() {
        let schema = OptionSchema::new().rule(
            "user",
            RuleSet::new().schema(OptionSchema::new().rule(
                "profile",
                RuleSet::new().schema(OptionSchema::new().rule("age", RuleSet::new().types([TypeTag::Int]))),
            )),
        );
        let err = run(json!({"user": {"profile": {"age": "old"}}}), &schema).unwrap_err();
        assert_eq!(err.key(), Some("user.profile.age"));

        let err = run(json!({"user": {"profile": {"x": 1}}}), &schema).unwrap_err();
        let VaultError::UndefinedKeys { keys, defined } = err else {
            panic!("expected undefined keys");
        };
        assert_eq!(keys, ["user.profile.x"]);
        assert_eq!(defined, ["user.profile.age"]);
    }

    #[test]
    fn test_nested_value_must_be_mapping() {
        let err = run(json!({"user": ["John"]}), &user_schema()).unwrap_err();
        let VaultError::InvalidValue { key, reason, .. } = err else {
            panic!("expected invalid value");
        };
        assert_eq!(key, "user");
        assert_eq!(
            reason,
            InvalidReason::Type {
                expected: vec![TypeTag::Mapping],
                found: "list",
            }
        );
    }

    #[test]
    fn test_nested_schema_inherits_policy() {
        let schema = OptionSchema::new()
            .allow_undefined_keys(true)
            .rule("db", RuleSet::new().schema(OptionSchema::new().rule("host", string())));
        let out = run(json!({"db": {"host": "h", "port": 1}}), &schema).unwrap();
        assert_eq!(out, json!({"db": {"host": "h", "port": 1}}));

        let schema = OptionSchema::new().allow_undefined_keys(true).rule(
            "db",
            RuleSet::new().schema(OptionSchema::new().rule("host", string()).allow_undefined_keys(false)),
        );
        let err = run(json!({"db": {"host": "h", "port": 1}}), &schema).unwrap_err();
        assert!(matches!(err, VaultError::UndefinedKeys { .. }));
    }

    #[test]
    fn test_nested_schema_replaces_normalizer() {
        let schema = OptionSchema::new().rule(
            "db",
            RuleSet::new()
                .normalizer(Normalizer::new(|_| Err("never".to_string())))
                .schema(OptionSchema::new().rule("host", string().default_value("localhost"))),
        );
        assert_eq!(run(json!({}), &schema).unwrap(), json!({"db": {"host": "localhost"}}));
    }
}
