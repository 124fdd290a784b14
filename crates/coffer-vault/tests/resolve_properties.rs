//! Property tests for option resolution: identity with an empty schema,
//! idempotence with pure normalizers, and defaults never overwriting
//! present keys.

use coffer_vault::{builtin, resolve, OptionSchema, RuleSet, TypeTag};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        " ?[a-zA-Z0-9]{0,12} ?".prop_map(Value::String),
    ]
}

fn mapping() -> impl Strategy<Value = Map<String, Value>> {
    let value = leaf().prop_recursive(3, 32, 6, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    });
    prop::collection::btree_map("[a-z]{1,6}", value, 0..8).prop_map(|m| m.into_iter().collect())
}

/// Defaults at two levels, an idempotent normalizer, undeclared keys allowed.
fn schema() -> OptionSchema {
    OptionSchema::new()
        .allow_undefined_keys(true)
        .rule(
            "name",
            RuleSet::new()
                .types([TypeTag::String])
                .default_value("anonymous")
                .normalizer(builtin::trim()),
        )
        .rule(
            "limits",
            RuleSet::new().schema(
                OptionSchema::new()
                    .rule("max", RuleSet::new().types([TypeTag::Int]).default_value(10))
                    .rule("min", RuleSet::new().types([TypeTag::Int]).default_value(0)),
            ),
        )
}

proptest! {
    #[test]
    fn empty_schema_is_identity(data in mapping(), allow in any::<bool>()) {
        prop_assert_eq!(resolve(data.clone(), &OptionSchema::new(), allow).unwrap(), data);
    }

    #[test]
    fn resolution_is_idempotent(data in mapping()) {
        let schema = schema();
        if let Ok(once) = resolve(data, &schema, false) {
            let twice = resolve(once.clone(), &schema, false).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    /// Declared keys present in the input keep their values; absent ones
    /// get their defaults.
    #[test]
    fn defaults_never_overwrite(
        name in proptest::option::of("[a-z]{1,8}"),
        max in proptest::option::of(any::<i64>()),
    ) {
        let mut data = Map::new();
        if let Some(name) = &name {
            data.insert("name".to_string(), json!(name));
        }
        let mut limits = Map::new();
        if let Some(max) = max {
            limits.insert("max".to_string(), json!(max));
        }
        data.insert("limits".to_string(), Value::Object(limits));

        let resolved = Value::Object(resolve(data, &schema(), false).unwrap());
        prop_assert_eq!(&resolved["name"], &json!(name.as_deref().unwrap_or("anonymous")));
        prop_assert_eq!(&resolved["limits"]["max"], &json!(max.unwrap_or(10)));
        prop_assert_eq!(&resolved["limits"]["min"], &json!(0));
    }
}
