//! # coffer-core — Path-Addressable Containers
//!
//! The foundation every Coffer container is built on. It depends on nothing
//! internal; `coffer-schema` and `coffer-vault` layer validation on top.
//!
//! ## Building Blocks
//!
//! - [`path`] — dotted-path get/set/has/remove over nested mappings,
//!   creating intermediate levels on write.
//! - [`OrderedMap`] — insertion-ordered storage with declarative
//!   [`Criteria`] (filter, sort, slice).
//! - [`Container`] — the trait that turns an `OrderedMap` into a
//!   path-addressable container. Every variant implements it.
//! - [`Bag`] — replace / merge / remove, no validation.
//! - [`Journal`] — append-only list with a reversed view.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Mappings always preserve insertion order (`serde_json/preserve_order`).

pub mod bag;
pub mod container;
pub mod criteria;
pub mod error;
pub mod journal;
pub mod map;
pub mod path;
pub mod value;

pub use bag::Bag;
pub use container::Container;
pub use criteria::{Comparison, Criteria, Expr, Order};
pub use error::CofferError;
pub use journal::Journal;
pub use map::OrderedMap;
pub use value::json_type_name;
