//! # Vault
//!
//! A path-addressable container whose data is resolved against an
//! [`OptionSchema`] on construction: defaults filled in, values checked and
//! normalized.
//!
//! Unlike the schema store, a vault's `validate` commits the resolved data
//! on success, so normalizers and defaults take effect on re-validation. On
//! failure the data is left as it was.

use coffer_core::{Container, OrderedMap};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::VaultError;
use crate::resolve::resolve;
use crate::schema::OptionSchema;

/// Container validated by option-resolution rules.
#[derive(Debug, Clone, Default)]
pub struct Vault {
    data: OrderedMap,
    schema: OptionSchema,
}

impl Vault {
    /// Build a vault, resolving `data` against `schema`.
    ///
    /// # Errors
    ///
    /// - `VaultError::Input` if `data` is not a mapping.
    /// - Any resolution error (see [`resolve`](crate::resolve())).
    pub fn new(data: Value, schema: OptionSchema, allow_undefined_keys: bool) -> Result<Self, VaultError> {
        let data = OrderedMap::from_value(data)?;
        let resolved = resolve(data.into_inner(), &schema, allow_undefined_keys)?;
        tracing::debug!(keys = resolved.len(), "vault resolved");
        Ok(Self {
            data: resolved.into(),
            schema,
        })
    }

    /// Build a vault without rules. The data is stored as given.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Input` if `data` is not a mapping.
    pub fn from_value(data: Value) -> Result<Self, VaultError> {
        Self::new(data, OptionSchema::new(), false)
    }

    /// Replace the schema. Stored data is not re-resolved.
    pub fn set_schema(&mut self, schema: OptionSchema) -> &mut Self {
        self.schema = schema;
        self
    }

    /// The schema exactly as set.
    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    /// Re-resolve the current data against the current schema and store the
    /// result.
    ///
    /// # Errors
    ///
    /// Any resolution error; the stored data is unchanged in that case.
    pub fn validate(&mut self, allow_undefined_keys: bool) -> Result<(), VaultError> {
        let resolved = resolve(self.data.as_map().clone(), &self.schema, allow_undefined_keys)?;
        self.data = resolved.into();
        Ok(())
    }
}

impl Container for Vault {
    fn collection(&self) -> &OrderedMap {
        &self.data
    }

    fn collection_mut(&mut self) -> &mut OrderedMap {
        &mut self.data
    }
}

impl Serialize for Vault {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

coffer_core::impl_path_index!(Vault);
