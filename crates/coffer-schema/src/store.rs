//! # Store
//!
//! A path-addressable container whose data is resolved against a JSON Schema
//! on construction. Resolution injects defaults and validates; a store that
//! was built successfully always starts from conforming data.
//!
//! Later writes through [`Container::set`] are not checked. Call
//! [`Store::validate`] to check the current data; it never modifies it.

use coffer_core::{Container, OrderedMap};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::StoreOptions;
use crate::document::SchemaDocument;
use crate::error::StoreError;
use crate::resolve::resolve;

/// Container validated by a JSON Schema document.
#[derive(Debug, Clone)]
pub struct Store {
    data: OrderedMap,
    schema: SchemaDocument,
}

impl Store {
    /// Build a store, resolving `data` against `schema`.
    ///
    /// An empty schema (`json!({})`) accepts any mapping unchanged.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidSchema` if the schema is malformed.
    /// - `StoreError::Input` if `data` is not a mapping.
    /// - `StoreError::Validation` if the defaulted data does not conform.
    pub fn new(data: Value, schema: Value) -> Result<Self, StoreError> {
        Self::with_options(data, schema, StoreOptions::default())
    }

    /// Build a store with explicit compilation options.
    ///
    /// # Errors
    ///
    /// Same as [`Store::new`].
    pub fn with_options(data: Value, schema: Value, options: StoreOptions) -> Result<Self, StoreError> {
        let schema = SchemaDocument::with_options(schema, &options)?;
        Self::from_document(data, schema)
    }

    /// Build a store from an already parsed schema document. Later
    /// [`Store::set_schema`] calls compile with the document's options.
    ///
    /// # Errors
    ///
    /// `StoreError::Input` or `StoreError::Validation`, as for [`Store::new`].
    pub fn from_document(data: Value, schema: SchemaDocument) -> Result<Self, StoreError> {
        let data = OrderedMap::from_value(data)?;
        let resolved = resolve(data.into_inner(), &schema)?;
        tracing::debug!(keys = resolved.len(), "store resolved");
        Ok(Self {
            data: resolved.into(),
            schema,
        })
    }

    /// Replace the schema. Stored data is not re-validated.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidSchema` if the new schema is malformed; the
    /// previous schema stays in place.
    pub fn set_schema(&mut self, schema: Value) -> Result<&mut Self, StoreError> {
        self.schema = SchemaDocument::with_options(schema, self.schema.options())?;
        Ok(self)
    }

    /// The schema as set, with `$schema` and `type` always present.
    pub fn schema(&self) -> &Value {
        self.schema.as_value()
    }

    /// The parsed schema document.
    pub fn document(&self) -> &SchemaDocument {
        &self.schema
    }

    /// The options this store compiles schemas with.
    pub fn options(&self) -> &StoreOptions {
        self.schema.options()
    }

    /// Check the current data against the current schema.
    ///
    /// Runs the full resolution on a copy; the stored data is not modified
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` listing every violation.
    pub fn validate(&self) -> Result<(), StoreError> {
        resolve(self.data.as_map().clone(), &self.schema).map(|_| ())
    }
}

impl Container for Store {
    fn collection(&self) -> &OrderedMap {
        &self.data
    }

    fn collection_mut(&mut self) -> &mut OrderedMap {
        &mut self.data
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

coffer_core::impl_path_index!(Store);
