//! # Dotted-Path Access
//!
//! Reads and writes values nested inside a mapping through dotted paths such
//! as `"user.profile.name"`. Every segment addresses a mapping key, or a list
//! index when the value at that level is a list and the segment is a valid
//! position.
//!
//! ## Rules
//!
//! - `get` / `has` never allocate and never modify the tree.
//! - `set` creates intermediate mappings on demand. A scalar (or a list that
//!   the segment cannot index) standing in the way is replaced by a new
//!   mapping.
//! - `remove` deletes only the addressed leaf; missing paths are a no-op.
//! - Key removal keeps the order of the remaining keys.

use serde_json::{Map, Value};

/// Split a path into its first segment and the remainder, if any.
fn split_head(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Step one level down from `value`.
fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Step one level down from `value`, creating the slot if needed.
fn slot<'a>(value: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match &*value {
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .filter(|i| *i < items.len()),
        _ => None,
    };

    match (value, index) {
        (Value::Array(items), Some(i)) => &mut items[i],
        (Value::Object(map), _) => map.entry(segment).or_insert(Value::Null),
        (other, _) => {
            *other = Value::Object(Map::new());
            slot(other, segment)
        }
    }
}

/// Look up a dotted path below an arbitrary value.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, child)
}

/// Look up a dotted path inside a mapping.
pub fn get<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = split_head(path);
    let first = root.get(head)?;
    match rest {
        Some(rest) => lookup(first, rest),
        None => Some(first),
    }
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(root: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let (head, rest) = split_head(path);
    let mut current = root.get_mut(head)?;
    if let Some(rest) = rest {
        for segment in rest.split('.') {
            current = child_mut(current, segment)?;
        }
    }
    Some(current)
}

/// Whether a value exists at `path`. An explicit `null` counts as present.
pub fn has(root: &Map<String, Value>, path: &str) -> bool {
    get(root, path).is_some()
}

/// Write `value` at `path`, creating intermediate mappings as needed.
pub fn set(root: &mut Map<String, Value>, path: &str, value: Value) {
    let (head, rest) = split_head(path);
    let mut current = root.entry(head).or_insert(Value::Null);
    if let Some(rest) = rest {
        for segment in rest.split('.') {
            current = slot(current, segment);
        }
    }
    *current = value;
}

/// Remove the value at `path`, returning it if it existed.
pub fn remove(root: &mut Map<String, Value>, path: &str) -> Option<Value> {
    let Some((parent, leaf)) = path.rsplit_once('.') else {
        return root.shift_remove(path);
    };
    match get_mut(root, parent)? {
        Value::Object(map) => map.shift_remove(leaf),
        Value::Array(items) => {
            let index = leaf.parse::<usize>().ok().filter(|i| *i < items.len())?;
            Some(items.remove(index))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_get_nested() {
        let root = map(json!({"user": {"profile": {"name": "John"}}}));
        assert_eq!(get(&root, "user.profile.name"), Some(&json!("John")));
        assert_eq!(get(&root, "user.profile.age"), None);
        assert_eq!(get(&root, "user.profile.name.first"), None);
    }

    #[test]
    fn test_get_list_index() {
        let root = map(json!({"items": [{"id": 1}, {"id": 2}]}));
        assert_eq!(get(&root, "items.1.id"), Some(&json!(2)));
        assert_eq!(get(&root, "items.5.id"), None);
        assert_eq!(get(&root, "items.x"), None);
    }

    #[test]
    fn test_has_counts_explicit_null() {
        let root = map(json!({"a": null}));
        assert!(has(&root, "a"));
        assert!(!has(&root, "b"));
    }

    #[test]
    fn test_set_creates_intermediate_levels() {
        let mut root = Map::new();
        set(&mut root, "a.b.c", json!(1));
        assert_eq!(Value::Object(root), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_replaces_scalar_in_the_way() {
        let mut root = map(json!({"a": 5}));
        set(&mut root, "a.b", json!(true));
        assert_eq!(Value::Object(root), json!({"a": {"b": true}}));
    }

    #[test]
    fn test_set_into_list_position() {
        let mut root = map(json!({"items": [1, 2, 3]}));
        set(&mut root, "items.1", json!(20));
        assert_eq!(Value::Object(root), json!({"items": [1, 20, 3]}));
    }

    #[test]
    fn test_remove_nested_leaf() {
        let mut root = map(json!({"a": {"b": {"c": 1}, "d": 2}}));
        assert_eq!(remove(&mut root, "a.b"), Some(json!({"c": 1})));
        assert!(!has(&root, "a.b.c"));
        assert_eq!(Value::Object(root), json!({"a": {"d": 2}}));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut root = map(json!({"a": 1}));
        assert_eq!(remove(&mut root, "x.y"), None);
        assert_eq!(remove(&mut root, "a.b"), None);
        assert_eq!(Value::Object(root), json!({"a": 1}));
    }

    #[test]
    fn test_remove_keeps_key_order() {
        let mut root = map(json!({"a": 1, "b": 2, "c": 3}));
        remove(&mut root, "a");
        let keys: Vec<&String> = root.keys().collect();
        assert_eq!(keys, ["b", "c"]);
    }
}
