//! Layer Compositor
//!
//! Merges the four declaration layers into one schema set. Later layers win
//! on name collision: core < meta for the core set, app < regional for the
//! application set, and the application set over the core set.

use tracing::debug;

use crate::layers::{LayerKind, LayerRegistry, SchemaSet};

/// Core and meta declarations, every entry flagged `is_core`
pub fn core_schemas(registry: &LayerRegistry) -> SchemaSet {
    let mut schemas = registry.layer(LayerKind::Core).clone();
    schemas.extend(
        registry
            .layer(LayerKind::Meta)
            .iter()
            .map(|(name, schema)| (name.clone(), schema.clone())),
    );

    for schema in schemas.values_mut() {
        schema.is_core = true;
    }
    schemas
}

/// App declarations overridden by the country's regional set
pub fn app_schemas(registry: &LayerRegistry, country_code: &str) -> SchemaSet {
    let mut schemas = registry.layer(LayerKind::App).clone();
    if let Some(regional) = registry.regional(country_code) {
        debug!(country = country_code, overrides = regional.len(), "applying regional layer");
        schemas.extend(regional.iter().map(|(name, schema)| (name.clone(), schema.clone())));
    }
    schemas
}

/// The full composed set: core first, application entries on top
pub fn compose(registry: &LayerRegistry, country_code: &str) -> SchemaSet {
    let mut schemas = core_schemas(registry);
    schemas.extend(app_schemas(registry, country_code));
    debug!(country = country_code, schemas = schemas.len(), "composed schema layers");
    schemas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use crate::schema::{Schema, NO_REGION};

    fn registry() -> LayerRegistry {
        let mut registry = LayerRegistry::new();
        registry.insert(LayerKind::Core, Schema::new("Base", "Base")).unwrap();
        registry.insert(LayerKind::Core, Schema::new("Settings", "Core Settings")).unwrap();
        registry.insert(LayerKind::Meta, Schema::new("Settings", "Meta Settings")).unwrap();
        registry
            .insert(
                LayerKind::App,
                Schema::new("Party", "Party").with_field(Field::new("email", "Email", FieldType::Data)),
            )
            .unwrap();
        registry.insert(LayerKind::App, Schema::new("Base", "App Base")).unwrap();
        registry
            .insert_regional(
                "in",
                Schema::new("Party", "Party").with_field(Field::new("gstin", "GSTIN", FieldType::Data)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_meta_overrides_core_and_flags_core() {
        let core = core_schemas(&registry());

        assert_eq!(core["Settings"].label, "Meta Settings");
        assert!(core.values().all(|s| s.is_core));
    }

    #[test]
    fn test_regional_overrides_app() {
        let registry = registry();

        let app = app_schemas(&registry, "in");
        assert!(app["Party"].has_field("gstin"));
        assert!(!app["Party"].has_field("email"));

        let generic = app_schemas(&registry, "zz");
        assert!(generic["Party"].has_field("email"));
    }

    #[test]
    fn test_app_wins_over_core() {
        let composed = compose(&registry(), NO_REGION);

        assert_eq!(composed["Base"].label, "App Base");
        assert!(!composed["Base"].is_core);
        assert!(composed["Settings"].is_core);
        assert_eq!(composed.len(), 3);
    }

    #[test]
    fn test_inputs_untouched() {
        let registry = registry();
        let _ = compose(&registry, "in");

        assert!(!registry.layer(LayerKind::Meta)["Settings"].is_core);
        assert!(registry.layer(LayerKind::App)["Party"].has_field("email"));
    }
}
