//! # Journal
//!
//! Append-only sequential storage. Entries are kept in the ordered map under
//! their position (`"0"`, `"1"`, ...), so they stay path-addressable like any
//! other container (`journal.get("2.message")`).

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::container::Container;
use crate::error::CofferError;
use crate::map::OrderedMap;

/// Sequential, append-only container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    data: OrderedMap,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal from a list of entries, or from a mapping whose
    /// values are taken as entries with their keys kept.
    ///
    /// # Errors
    ///
    /// Returns `CofferError::InvalidInput` for scalars and `null`.
    pub fn from_value(entries: Value) -> Result<Self, CofferError> {
        let data = match entries {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Value::Object(map) => OrderedMap::from(map),
            other => {
                return Err(CofferError::InvalidInput {
                    expected: "list or mapping",
                    found: crate::value::json_type_name(&other),
                })
            }
        };
        Ok(Self { data })
    }

    /// Append an entry after the highest existing position.
    pub fn add(&mut self, item: impl Into<Value>) -> &mut Self {
        let position = self.next_position();
        self.data.insert(position.to_string(), item.into());
        self
    }

    /// One past the highest position, or the lowest free position when that
    /// would overflow or is already taken.
    fn next_position(&self) -> usize {
        let after_max = self
            .data
            .keys()
            .filter_map(|k| k.parse::<usize>().ok())
            .max()
            .map_or(Some(0), |max| max.checked_add(1));
        match after_max {
            Some(position) if !self.data.contains_key(&position.to_string()) => position,
            // len + 1 candidates over len keys: one is always free.
            _ => (0..=self.data.len())
                .find(|p| !self.data.contains_key(&p.to_string()))
                .unwrap_or(self.data.len()),
        }
    }

    /// Entries from oldest to newest.
    pub fn items(&self) -> Vec<Value> {
        self.data.values().cloned().collect()
    }

    /// Entries from newest to oldest.
    pub fn reverse(&self) -> Vec<Value> {
        self.data.values().rev().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the journal has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Container for Journal {
    fn collection(&self) -> &OrderedMap {
        &self.data
    }

    fn collection_mut(&mut self) -> &mut OrderedMap {
        &mut self.data
    }

    fn all(&self) -> Value {
        Value::Array(self.items())
    }
}

impl Serialize for Journal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.values())
    }
}

crate::impl_path_index!(Journal);
