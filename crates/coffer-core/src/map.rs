//! # Ordered Map
//!
//! The storage primitive behind every container: an insertion-ordered
//! `String → Value` mapping. It wraps `serde_json::Map` built with the
//! `preserve_order` feature, so iteration, serialization and removal all
//! respect insertion order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::criteria::Criteria;
use crate::error::CofferError;

/// Insertion-ordered mapping of string keys to JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedMap(Map<String, Value>);

impl OrderedMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be a mapping.
    ///
    /// # Errors
    ///
    /// Returns `CofferError::InvalidInput` for any non-object value.
    pub fn from_value(value: Value) -> Result<Self, CofferError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CofferError::expected_mapping(&other)),
        }
    }

    /// Build from anything serializable to a JSON mapping (structs, maps).
    ///
    /// # Errors
    ///
    /// Returns `CofferError::Serialization` if serialization fails and
    /// `CofferError::InvalidInput` if the result is not a mapping.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CofferError> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Clone the contents into a plain JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consume into a plain JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Consume into the inner `serde_json::Map`.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Borrow the inner map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Mutably borrow the inner map.
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level lookup (no path interpretation).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Mutable top-level lookup.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Whether a top-level key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or overwrite a top-level entry. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a top-level entry, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> serde_json::map::Keys<'_> {
        self.0.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> serde_json::map::Values<'_> {
        self.0.values()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    /// First entry in insertion order.
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.0.iter().next()
    }

    /// Last entry in insertion order.
    pub fn last(&self) -> Option<(&String, &Value)> {
        self.0.iter().next_back()
    }

    /// Entries whose value satisfies `predicate`, keys preserved.
    pub fn filter(&self, mut predicate: impl FnMut(&str, &Value) -> bool) -> Self {
        self.0
            .iter()
            .filter(|(k, v)| predicate(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Apply declarative criteria, returning a new map with the selected
    /// entries in criteria order.
    pub fn matching(&self, criteria: &Criteria) -> Self {
        Self(criteria.apply(&self.0))
    }
}

impl From<Map<String, Value>> for OrderedMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<OrderedMap> for Value {
    fn from(map: OrderedMap) -> Self {
        map.into_value()
    }
}

impl TryFrom<Value> for OrderedMap {
    type Error = CofferError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl FromIterator<(String, Value)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for OrderedMap {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
