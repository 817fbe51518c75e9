//! Freezer
//!
//! Seals the finished map so later code cannot mutate shared schema state.
//! The guarded mutators on [`SchemaMap`] and [`Schema`](crate::Schema) reject
//! changes once sealed. Production builds skip sealing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::SchemaMap;

/// Whether the build runs with development-time safety checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl Default for BuildMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }
}

/// Seal the map and every schema in it, unless building for production
pub fn freeze(map: &mut SchemaMap, mode: BuildMode) {
    if mode == BuildMode::Production {
        return;
    }
    for schema in map.schemas_mut().values_mut() {
        schema.mark_frozen();
    }
    map.mark_frozen();
    debug!(schemas = map.len(), "froze schema map");
}
