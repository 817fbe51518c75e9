//! Schema build pipeline
//!
//! ```text
//! LayerRegistry ─► compose ─► inject ─► prune ─► stamp ─► custom ─► freeze ─► Arc<SchemaMap>
//! ```
//!
//! The build is synchronous and owns the map exclusively until it is frozen
//! and handed out. It never fails: missing mixins, unknown regions and
//! unplaceable custom fields are skipped and reported through
//! [`Diagnostics`]. Changing region or custom fields means building a new map.

pub mod compose;
pub mod custom;
pub mod freeze;
pub mod inject;
pub mod prune;
pub mod stamp;

pub use custom::RawCustomField;
pub use freeze::BuildMode;
pub use inject::MixinKind;

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::layers::LayerRegistry;
use crate::schema::{SchemaMap, NO_REGION};

/// Builds schema maps from a registry
#[derive(Debug, Clone)]
pub struct SchemaBuilder<'a> {
    registry: &'a LayerRegistry,
    country_code: String,
    mode: BuildMode,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(registry: &'a LayerRegistry) -> Self {
        Self {
            registry,
            country_code: NO_REGION.to_string(),
            mode: BuildMode::default(),
        }
    }

    /// Builder preset from the `[build]` configuration section
    pub fn from_config(registry: &'a LayerRegistry, config: &EngineConfig) -> Self {
        Self::new(registry)
            .country_code(Some(config.build.country_code.as_str()))
            .mode(config.build.mode)
    }

    /// Region to apply; `None` and empty strings mean no region
    pub fn country_code(mut self, country_code: Option<&str>) -> Self {
        self.country_code = match country_code.map(str::trim) {
            Some(code) if !code.is_empty() => code.to_lowercase(),
            _ => NO_REGION.to_string(),
        };
        self
    }

    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(&self, raw_custom_fields: &[RawCustomField]) -> Arc<SchemaMap> {
        self.build_with_report(raw_custom_fields).0
    }

    /// Build and also return what was skipped along the way
    pub fn build_with_report(&self, raw_custom_fields: &[RawCustomField]) -> (Arc<SchemaMap>, Diagnostics) {
        let span = debug_span!("build_schema_map", country = %self.country_code, mode = ?self.mode);
        let _guard = span.enter();
        let mut diagnostics = Diagnostics::new();

        let mut schemas = compose::compose(self.registry, &self.country_code);
        inject::inject_meta_fields(&mut schemas, &mut diagnostics);
        let pruned = prune::prune_removed_fields(&mut schemas);
        stamp::stamp_schema_names(&mut schemas);
        custom::merge_custom_fields(&mut schemas, raw_custom_fields, &mut diagnostics);

        let mut map = SchemaMap::from_schemas(self.country_code.clone(), schemas);
        freeze::freeze(&mut map, self.mode);

        debug!(
            schemas = map.len(),
            pruned,
            diagnostics = diagnostics.len(),
            "built schema map"
        );
        (Arc::new(map), diagnostics)
    }
}

/// Build the schema map for a country with the default build mode
pub fn get_schemas(
    registry: &LayerRegistry,
    country_code: Option<&str>,
    raw_custom_fields: &[RawCustomField],
) -> Arc<SchemaMap> {
    SchemaBuilder::new(registry)
        .country_code(country_code)
        .build(raw_custom_fields)
}
