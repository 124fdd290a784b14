//! # Bag
//!
//! The simplest container: path-addressable data with replace, recursive
//! merge and top-level removal. No validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::container::Container;
use crate::error::CofferError;
use crate::map::OrderedMap;
use crate::value::merge_recursive;

/// Unvalidated key/value container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag {
    data: OrderedMap,
}

impl Bag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag from a JSON mapping.
    ///
    /// # Errors
    ///
    /// Returns `CofferError::InvalidInput` if `data` is not a mapping.
    pub fn from_value(data: Value) -> Result<Self, CofferError> {
        Ok(Self {
            data: OrderedMap::from_value(data)?,
        })
    }

    /// Discard all data and store `data` instead.
    ///
    /// # Errors
    ///
    /// Returns `CofferError::InvalidInput` if `data` is not a mapping; the
    /// bag is left unchanged.
    pub fn replace(&mut self, data: Value) -> Result<&mut Self, CofferError> {
        self.data = OrderedMap::from_value(data)?;
        Ok(self)
    }

    /// Deep-merge `data` into the bag.
    ///
    /// Nested mappings merge key by key, lists merge position by position,
    /// anything else overwrites.
    ///
    /// # Errors
    ///
    /// Returns `CofferError::InvalidInput` if `data` is not a mapping; the
    /// bag is left unchanged.
    pub fn merge(&mut self, data: Value) -> Result<&mut Self, CofferError> {
        let overlay = OrderedMap::from_value(data)?;
        for (key, value) in overlay {
            match self.data.get_mut(&key) {
                Some(existing) => merge_recursive(existing, value),
                None => {
                    self.data.insert(key, value);
                }
            }
        }
        Ok(self)
    }

    /// Remove a top-level key. The key is taken literally, not as a path.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.data.remove(key);
        self
    }
}

impl From<OrderedMap> for Bag {
    fn from(data: OrderedMap) -> Self {
        Self { data }
    }
}

impl Container for Bag {
    fn collection(&self) -> &OrderedMap {
        &self.data
    }

    fn collection_mut(&mut self) -> &mut OrderedMap {
        &mut self.data
    }
}

crate::impl_path_index!(Bag);
