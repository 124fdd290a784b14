//! # Container Trait
//!
//! Path-addressable access shared by every container variant. Implementors
//! only expose their [`OrderedMap`]; the provided methods layer the dotted
//! path rules of [`crate::path`] on top.
//!
//! Writes through [`Container::set`] and [`Container::clear_at`] never run
//! schema validation, even on validating containers. Call their own
//! `validate()` to check the current data.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::criteria::Criteria;
use crate::error::CofferError;
use crate::map::OrderedMap;
use crate::path;

/// Common behavior of every container.
pub trait Container {
    /// The underlying ordered storage.
    fn collection(&self) -> &OrderedMap;

    /// Mutable access to the underlying storage.
    fn collection_mut(&mut self) -> &mut OrderedMap;

    /// The complete data as a plain JSON value.
    fn all(&self) -> Value {
        self.collection().to_value()
    }

    /// Value at a dotted path.
    fn get(&self, path: &str) -> Option<&Value> {
        path::get(self.collection().as_map(), path)
    }

    /// Value at a dotted path, or `default` when absent.
    fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    /// Deserialize the value at a dotted path into `T`.
    ///
    /// Returns `Ok(None)` when the path is absent.
    ///
    /// # Errors
    ///
    /// Returns `CofferError::Serialization` if the value does not fit `T`.
    fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CofferError>
    where
        Self: Sized,
    {
        self.get(path)
            .map(|v| T::deserialize(v).map_err(CofferError::from))
            .transpose()
    }

    /// Write a value at a dotted path, creating intermediate mappings.
    fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        path::set(self.collection_mut().as_map_mut(), path, value.into());
        self
    }

    /// Whether a value exists at a dotted path.
    fn has(&self, path: &str) -> bool {
        path::has(self.collection().as_map(), path)
    }

    /// Remove every value.
    fn clear(&mut self) {
        self.collection_mut().clear();
    }

    /// Remove the value at a dotted path. Missing paths are a no-op.
    fn clear_at(&mut self, path: &str) -> Option<Value> {
        path::remove(self.collection_mut().as_map_mut(), path)
    }

    /// Entries selected by `criteria`, as a new map.
    fn matching(&self, criteria: &Criteria) -> OrderedMap {
        self.collection().matching(criteria)
    }
}

/// Implement `Index<&str>` (dotted path, missing ⇒ `null`) for a container.
#[macro_export]
macro_rules! impl_path_index {
    ($ty:ty) => {
        impl ::std::ops::Index<&str> for $ty {
            type Output = ::serde_json::Value;

            fn index(&self, path: &str) -> &Self::Output {
                static NULL: ::serde_json::Value = ::serde_json::Value::Null;
                $crate::Container::get(self, path).unwrap_or(&NULL)
            }
        }
    };
}
