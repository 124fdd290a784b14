//! # coffer-schema — JSON Schema Containers
//!
//! Provides [`Store`], a path-addressable container whose data is resolved
//! against a JSON Schema (draft 2020-12) document.
//!
//! ## Resolution (`resolve`)
//!
//! Defaults declared under `properties` are injected top-down, then the
//! defaulted data is validated with the `jsonschema` crate. Failures list
//! every violation with its JSON Pointer. Schemas without root `properties`
//! disable resolution entirely.
//!
//! ## Documents (`document`)
//!
//! [`SchemaDocument`] parses a schema once: root `$schema`/`type` injection,
//! extraction of the `properties` tree, legacy bound upgrades and
//! compilation. JSON and YAML sources are supported.
//!
//! ```
//! use coffer_core::Container;
//! use coffer_schema::Store;
//! use serde_json::json;
//!
//! let store = Store::new(
//!     json!({"name": "John"}),
//!     json!({
//!         "required": ["name"],
//!         "properties": {
//!             "name": {"type": "string"},
//!             "age": {"type": "integer", "default": 18},
//!         },
//!     }),
//! ).unwrap();
//! assert_eq!(store.get("age"), Some(&json!(18)));
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `coffer-core` internally.
//! - No `unwrap()` outside tests; every failure is a [`StoreError`].

pub mod config;
pub mod document;
pub mod error;
pub mod resolve;
pub mod store;

pub use config::StoreOptions;
pub use document::{PropertyNode, SchemaDocument, SCHEMA_DIALECT};
pub use error::{StoreError, ValidationViolations, Violation};
pub use resolve::{apply_defaults, resolve};
pub use store::Store;
