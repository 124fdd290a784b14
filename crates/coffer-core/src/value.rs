//! # Value Helpers
//!
//! Small utilities over `serde_json::Value` shared by every crate in the
//! workspace: JSON type naming for error messages, a total ordering used by
//! criteria sorting, and the recursive merge behind [`Bag::merge`].
//!
//! [`Bag::merge`]: crate::Bag::merge

use std::cmp::Ordering;

use serde_json::Value;

/// Returns the JSON type name of a value, as used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compare two values when they are of comparable kinds.
///
/// Numbers compare numerically regardless of integer/float representation,
/// strings lexicographically, booleans with `false < true`. Any other pair
/// (including mixed kinds) is incomparable.
pub fn partial_compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total ordering over values for sorting.
///
/// Values of different kinds are ordered by kind rank
/// (null < bool < number < string < array < object); values of the same
/// kind use [`partial_compare`], with arrays and objects comparing equal.
pub fn total_compare(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    rank(a)
        .cmp(&rank(b))
        .then_with(|| partial_compare(a, b).unwrap_or(Ordering::Equal))
}

/// Recursively merge `overlay` into `base`.
///
/// Mappings merge key by key and lists merge index by index (an overlay
/// element replaces the base element at the same position, extra overlay
/// elements are appended). Every other combination overwrites.
pub fn merge_recursive(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_recursive(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            for (i, value) in overlay_items.into_iter().enumerate() {
                match base_items.get_mut(i) {
                    Some(existing) => merge_recursive(existing, value),
                    None => base_items.push(value),
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
