//! # Store Configuration
//!
//! Knobs for how a schema document is compiled. Deserializable so hosts can
//! embed them in their own configuration files.

use serde::{Deserialize, Serialize};

/// Options applied when compiling a [`SchemaDocument`](crate::SchemaDocument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Treat `format` as an assertion (draft 2020-12 only annotates by default).
    pub validate_formats: bool,
    /// Rewrite draft-4 boolean `exclusiveMinimum` / `exclusiveMaximum` into
    /// their numeric form before compiling.
    pub upgrade_legacy_bounds: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            validate_formats: true,
            upgrade_legacy_bounds: true,
        }
    }
}
