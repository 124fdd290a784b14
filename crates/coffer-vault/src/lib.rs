//! # coffer-vault — Option-Resolution Containers
//!
//! Provides [`Vault`], a path-addressable container whose data is resolved
//! against an [`OptionSchema`]: a per-key table of [`RuleSet`]s with
//! accepted [`TypeTag`]s, required flags, allowed choices, defaults,
//! [`Normalizer`]s and nested schemas.
//!
//! ```
//! use coffer_core::Container;
//! use coffer_vault::{OptionSchema, RuleSet, TypeTag, Vault};
//! use serde_json::json;
//!
//! let schema = OptionSchema::new().rule(
//!     "user",
//!     RuleSet::new().types([TypeTag::Mapping]).schema(
//!         OptionSchema::new()
//!             .rule("name", RuleSet::new().types([TypeTag::String]).required())
//!             .rule("email", RuleSet::new().default_value("default@example.com")),
//!     ),
//! );
//! let vault = Vault::new(json!({"user": {"name": "John"}}), schema, false).unwrap();
//! assert_eq!(vault.get("user.email"), Some(&json!("default@example.com")));
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `coffer-core` internally.
//! - Resolution stops at the first failure; errors name the dotted path of
//!   the offending key.
//! - No `unwrap()` outside tests.

pub mod error;
pub mod resolve;
pub mod rule;
pub mod schema;
pub mod types;
pub mod vault;

pub use error::{InvalidReason, VaultError};
pub use resolve::resolve;
pub use rule::{builtin, Normalizer, RuleSet};
pub use schema::{NormalizerRegistry, OptionSchema};
pub use types::{type_of, TypeTag, UnknownTypeTag};
pub use vault::Vault;
