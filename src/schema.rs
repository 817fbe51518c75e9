//! Schema types and the composed schema map

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::field::Field;

/// Country code sentinel meaning "no regional layer"
pub const NO_REGION: &str = "-";

/// Policy for generating a document's identity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Naming {
    /// Random hash; such schemas get no synthesized `name` field
    Random,
    NumberSeries,
    Autoincrement,
    Manual,
}

/// A document type description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming: Option<Naming>,

    #[serde(default)]
    pub is_tree: bool,

    #[serde(default)]
    pub is_child: bool,

    #[serde(default)]
    pub is_submittable: bool,

    #[serde(default)]
    pub is_single: bool,

    /// Set by the compositor for core and meta layer entries
    #[serde(default)]
    pub is_core: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyword_fields: Vec<String>,

    /// Ordered; order drives default layout
    #[serde(default)]
    pub(crate) fields: Vec<Field>,

    #[serde(skip)]
    frozen: bool,
}

impl Schema {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            naming: None,
            is_tree: false,
            is_child: false,
            is_submittable: false,
            is_single: false,
            is_core: false,
            title_field: None,
            keyword_fields: Vec::new(),
            fields: Vec::new(),
            frozen: false,
        }
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = Some(naming);
        self
    }

    pub fn tree(mut self) -> Self {
        self.is_tree = true;
        self
    }

    pub fn child(mut self) -> Self {
        self.is_child = true;
        self
    }

    pub fn submittable(mut self) -> Self {
        self.is_submittable = true;
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, fieldname: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.fieldname == fieldname)
    }

    pub fn has_field(&self, fieldname: &str) -> bool {
        self.field(fieldname).is_some()
    }

    pub fn fieldnames(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.fieldname.as_str())
    }

    /// Fields synthesized by the pipeline
    pub fn meta_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.meta)
    }

    pub fn custom_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_custom)
    }

    pub fn is_random_named(&self) -> bool {
        self.naming == Some(Naming::Random)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Append a field; rejected once the schema is frozen
    pub fn push_field(&mut self, field: Field) -> Result<()> {
        self.fields_mut()?.push(field);
        Ok(())
    }

    /// Mutable access to the field list; rejected once the schema is frozen
    pub fn fields_mut(&mut self) -> Result<&mut Vec<Field>> {
        if self.frozen {
            return Err(SchemaError::frozen("modify fields", self.name.clone()));
        }
        Ok(&mut self.fields)
    }

    pub fn field_mut(&mut self, fieldname: &str) -> Result<&mut Field> {
        let schema = self.name.clone();
        self.fields_mut()?
            .iter_mut()
            .find(|f| f.fieldname == fieldname)
            .ok_or_else(|| SchemaError::NotFound {
                name: format!("{}.{}", schema, fieldname),
            })
    }

    pub(crate) fn mark_frozen(&mut self) {
        self.frozen = true;
    }
}

/// The composed, effectively immutable map of every schema in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMap {
    country_code: String,
    built_at: DateTime<Utc>,
    schemas: BTreeMap<String, Schema>,
    #[serde(skip)]
    frozen: bool,
}

impl SchemaMap {
    pub(crate) fn from_schemas(country_code: impl Into<String>, schemas: BTreeMap<String, Schema>) -> Self {
        Self {
            country_code: country_code.into(),
            built_at: Utc::now(),
            schemas,
            frozen: false,
        }
    }

    /// Country code the map was built for (`"-"` when no region applied)
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Look up a field through its owning schema
    pub fn field(&self, schema: &str, fieldname: &str) -> Option<&Field> {
        self.get(schema).and_then(|s| s.field(fieldname))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Schemas that can be opened as documents (mixin templates excluded)
    pub fn document_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas
            .values()
            .filter(|s| crate::pipeline::MixinKind::from_schema_name(&s.name).is_none())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn insert(&mut self, schema: Schema) -> Result<Option<Schema>> {
        if self.frozen {
            return Err(SchemaError::frozen("insert schema", schema.name));
        }
        Ok(self.schemas.insert(schema.name.clone(), schema))
    }

    pub fn remove(&mut self, name: &str) -> Result<Option<Schema>> {
        if self.frozen {
            return Err(SchemaError::frozen("remove schema", name));
        }
        Ok(self.schemas.remove(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Schema> {
        if self.frozen {
            return Err(SchemaError::frozen("modify schema", name));
        }
        self.schemas
            .get_mut(name)
            .ok_or_else(|| SchemaError::NotFound { name: name.to_string() })
    }

    pub(crate) fn schemas_mut(&mut self) -> &mut BTreeMap<String, Schema> {
        &mut self.schemas
    }

    pub(crate) fn mark_frozen(&mut self) {
        self.frozen = true;
    }
}
