//! Layer Registry
//!
//! Static schema declarations grouped into four layers:
//!
//! ```text
//! schemas/
//! ├── core/        framework mixins (Base, Child, Tree, Submittable)
//! ├── meta/        framework bookkeeping (PatchRun, SingleValue, ...)
//! ├── app/         business document types
//! └── regional/
//!     ├── in/      overrides applied for country code "in"
//!     └── ch/
//! ```
//!
//! One schema per JSON file. The shipped tree is embedded at compile time;
//! deployments can load their own tree with [`LayerRegistry::from_directory`].
//! Loading is the only place malformed declarations are reported.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path};

use include_dir::{include_dir, Dir};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, SchemaError};
use crate::schema::{Schema, NO_REGION};

static EMBEDDED_SCHEMAS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/schemas");

/// Schemas of one layer keyed by schema name
pub type SchemaSet = BTreeMap<String, Schema>;

/// Non-regional declaration layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Core,
    Meta,
    App,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Core, LayerKind::Meta, LayerKind::App];

    /// Directory holding this layer's declarations
    pub fn dir_name(&self) -> &'static str {
        match self {
            LayerKind::Core => "core",
            LayerKind::Meta => "meta",
            LayerKind::App => "app",
        }
    }

    fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == name)
    }
}

const REGIONAL_DIR: &str = "regional";

/// Where a declaration file belongs
enum Placement {
    Layer(LayerKind),
    Regional(String),
}

/// All static schema declarations
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    core: SchemaSet,
    meta: SchemaSet,
    app: SchemaSet,
    regional: BTreeMap<String, SchemaSet>,
}

impl LayerRegistry {
    /// An empty registry, filled with [`insert`](Self::insert)
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry built from the declarations compiled into the crate
    pub fn embedded() -> Result<Self> {
        let mut files = Vec::new();
        collect_embedded_files(&EMBEDDED_SCHEMAS, &mut files);

        let mut registry = Self::new();
        for (path, content) in files {
            registry.add_declaration(path, content)?;
        }
        debug!(schemas = registry.schema_count(), "loaded embedded schema layers");
        Ok(registry)
    }

    /// Registry loaded from a directory laid out like the embedded tree
    pub fn from_directory(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut registry = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| SchemaError::InvalidDeclaration {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            let content = fs::read_to_string(path)?;
            registry.add_declaration(relative, &content)?;
        }

        debug!(root = %root.display(), schemas = registry.schema_count(), "loaded schema layers from directory");
        Ok(registry)
    }

    /// Add or replace a schema in a layer
    ///
    /// The schema is checked like a loaded declaration: it needs a name and
    /// unique, non-empty fieldnames.
    pub fn insert(&mut self, layer: LayerKind, schema: Schema) -> Result<Option<Schema>> {
        let path = Path::new(layer.dir_name()).join(format!("{}.json", schema.name));
        validate_declaration(&path, &schema)?;
        Ok(self.place(Placement::Layer(layer), schema))
    }

    /// Add or replace a schema in a country's override layer
    pub fn insert_regional(&mut self, country_code: &str, schema: Schema) -> Result<Option<Schema>> {
        let country = country_code.to_lowercase();
        let path = Path::new(REGIONAL_DIR)
            .join(&country)
            .join(format!("{}.json", schema.name));
        validate_declaration(&path, &schema)?;
        Ok(self.place(Placement::Regional(country), schema))
    }

    fn place(&mut self, placement: Placement, schema: Schema) -> Option<Schema> {
        let set = match placement {
            Placement::Layer(kind) => self.layer_mut(kind),
            Placement::Regional(country) => self.regional.entry(country).or_default(),
        };
        set.insert(schema.name.clone(), schema)
    }

    pub fn layer(&self, layer: LayerKind) -> &SchemaSet {
        match layer {
            LayerKind::Core => &self.core,
            LayerKind::Meta => &self.meta,
            LayerKind::App => &self.app,
        }
    }

    fn layer_mut(&mut self, layer: LayerKind) -> &mut SchemaSet {
        match layer {
            LayerKind::Core => &mut self.core,
            LayerKind::Meta => &mut self.meta,
            LayerKind::App => &mut self.app,
        }
    }

    /// Override set for a country code; unknown codes and `"-"` have none
    pub fn regional(&self, country_code: &str) -> Option<&SchemaSet> {
        if country_code == NO_REGION {
            return None;
        }
        self.regional.get(&country_code.to_lowercase())
    }

    /// Country codes with declared overrides
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.regional.keys().map(String::as_str)
    }

    pub fn schema_count(&self) -> usize {
        self.core.len()
            + self.meta.len()
            + self.app.len()
            + self.regional.values().map(BTreeMap::len).sum::<usize>()
    }

    fn add_declaration(&mut self, relative_path: &Path, content: &str) -> Result<()> {
        let Some(placement) = placement_for(relative_path) else {
            debug!(path = %relative_path.display(), "skipping declaration outside known layers");
            return Ok(());
        };

        let schema: Schema = serde_json::from_str(content).map_err(|e| SchemaError::InvalidDeclaration {
            path: relative_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        validate_declaration(relative_path, &schema)?;
        self.place(placement, schema);
        Ok(())
    }
}

/// Recursively collect JSON files from the embedded directory
fn collect_embedded_files<'a>(dir: &'a Dir<'static>, files: &mut Vec<(&'a Path, &'a str)>) {
    for file in dir.files() {
        let path = file.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Some(content) = file.contents_utf8() {
                files.push((path, content));
            }
        }
    }

    for subdir in dir.dirs() {
        collect_embedded_files(subdir, files);
    }
}

fn placement_for(relative_path: &Path) -> Option<Placement> {
    let parts: Vec<&str> = relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    match parts.as_slice() {
        [layer, _file] => LayerKind::from_dir_name(layer).map(Placement::Layer),
        [REGIONAL_DIR, country, _file] => Some(Placement::Regional(country.to_lowercase())),
        _ => None,
    }
}

/// Reject declarations that would break map invariants downstream
fn validate_declaration(path: &Path, schema: &Schema) -> Result<()> {
    if schema.name.trim().is_empty() {
        return Err(SchemaError::InvalidDeclaration {
            path: path.to_path_buf(),
            reason: "schema has no name".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for field in schema.fields() {
        if field.fieldname.trim().is_empty() {
            return Err(SchemaError::InvalidDeclaration {
                path: path.to_path_buf(),
                reason: format!("field without fieldname on {}", schema.name),
            });
        }
        if !seen.insert(field.fieldname.as_str()) {
            return Err(SchemaError::DuplicateField {
                schema: schema.name.clone(),
                fieldname: field.fieldname.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use tempfile::tempdir;

    #[test]
    fn test_embedded_layers() {
        let registry = LayerRegistry::embedded().unwrap();

        for mixin in ["Base", "Child", "Tree", "Submittable"] {
            assert!(registry.layer(LayerKind::Core).contains_key(mixin), "missing {}", mixin);
        }
        assert!(registry.layer(LayerKind::Meta).contains_key("SingleValue"));
        assert!(registry.layer(LayerKind::App).contains_key("Party"));
        assert_eq!(registry.countries().collect::<Vec<_>>(), vec!["ch", "in"]);
    }

    #[test]
    fn test_regional_lookup_is_case_insensitive() {
        let registry = LayerRegistry::embedded().unwrap();

        let india = registry.regional("IN").unwrap();
        assert!(india.contains_key("Party"));
        assert!(india.contains_key("Address"));
        assert!(registry.regional("zz").is_none());
        assert!(registry.regional(NO_REGION).is_none());
    }

    #[test]
    fn test_from_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::create_dir_all(dir.path().join("regional/DE")).unwrap();
        fs::write(
            dir.path().join("app/Note.json"),
            r#"{"name": "Note", "label": "Note", "fields": [{"fieldname": "body", "label": "Body", "fieldtype": "Text"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("regional/DE/Note.json"), r#"{"name": "Note", "label": "Notiz"}"#).unwrap();
        fs::write(dir.path().join("README.md"), "not a schema").unwrap();

        let registry = LayerRegistry::from_directory(dir.path()).unwrap();

        assert_eq!(registry.layer(LayerKind::App)["Note"].fields().len(), 1);
        assert_eq!(registry.regional("de").unwrap()["Note"].label, "Notiz");
        assert_eq!(registry.schema_count(), 2);
    }

    #[test]
    fn test_duplicate_fieldname_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(
            dir.path().join("app/Note.json"),
            r#"{"name": "Note", "fields": [{"fieldname": "body"}, {"fieldname": "body"}]}"#,
        )
        .unwrap();

        let err = LayerRegistry::from_directory(dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { ref fieldname, .. } if fieldname == "body"));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("meta")).unwrap();
        fs::write(dir.path().join("meta/Broken.json"), "{ not json").unwrap();

        let err = LayerRegistry::from_directory(dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut registry = LayerRegistry::new();
        assert!(registry.insert(LayerKind::App, Schema::new("Item", "Item")).unwrap().is_none());
        let previous = registry.insert(LayerKind::App, Schema::new("Item", "Product")).unwrap();

        assert_eq!(previous.unwrap().label, "Item");
        assert_eq!(registry.layer(LayerKind::App)["Item"].label, "Product");
    }

    #[test]
    fn test_insert_rejects_duplicate_fieldname() {
        let mut registry = LayerRegistry::new();
        let note = Schema::new("Note", "Note")
            .with_field(Field::new("body", "Body", FieldType::Text))
            .with_field(Field::new("body", "Body Again", FieldType::Text));

        let err = registry.insert(LayerKind::App, note).unwrap_err();

        assert!(matches!(err, SchemaError::DuplicateField { ref fieldname, .. } if fieldname == "body"));
        assert!(registry.layer(LayerKind::App).is_empty());
    }

    #[test]
    fn test_insert_regional_rejects_empty_fieldname() {
        let mut registry = LayerRegistry::new();
        let party = Schema::new("Party", "Party").with_field(Field::new("  ", "Blank", FieldType::Data));

        let err = registry.insert_regional("IN", party).unwrap_err();

        assert!(matches!(err, SchemaError::InvalidDeclaration { ref path, .. } if path.starts_with("regional/in")));
        assert!(registry.regional("in").is_none());
        assert!(registry.insert(LayerKind::App, Schema::new(" ", "Nameless")).is_err());
    }
}
