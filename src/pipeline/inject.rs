//! Meta-Field Injector
//!
//! Prepends synthesized fields to every schema: the identity field, then the
//! fields of the mixin templates selected by the schema's flags. Mixin
//! templates are ordinary schemas in the composed set; they are captured once
//! before any schema is touched and every injection gets its own copy.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::diagnostics::Diagnostics;
use crate::field::{Field, FieldType};
use crate::layers::SchemaSet;
use crate::schema::Schema;

/// Fieldname of the synthesized identity field
pub const NAME_FIELD: &str = "name";

/// Special schemas whose fields are injected based on flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixinKind {
    Base,
    Child,
    Tree,
    Submittable,
}

impl MixinKind {
    pub const ALL: [MixinKind; 4] = [MixinKind::Base, MixinKind::Child, MixinKind::Tree, MixinKind::Submittable];

    pub fn schema_name(&self) -> &'static str {
        match self {
            MixinKind::Base => "Base",
            MixinKind::Child => "Child",
            MixinKind::Tree => "Tree",
            MixinKind::Submittable => "Submittable",
        }
    }

    pub fn from_schema_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.schema_name() == name)
    }

    /// Mixins a schema receives, in injection order.
    ///
    /// Tree, Child and Base are alternatives with tree taking priority;
    /// Submittable stacks on top of whichever was chosen.
    pub fn for_schema(schema: &Schema) -> Vec<MixinKind> {
        let mut kinds = Vec::with_capacity(2);
        if schema.is_tree {
            kinds.push(MixinKind::Tree);
        } else if schema.is_child {
            kinds.push(MixinKind::Child);
        } else {
            kinds.push(MixinKind::Base);
        }
        if schema.is_submittable {
            kinds.push(MixinKind::Submittable);
        }
        kinds
    }
}

/// The identity field template
pub fn identity_field() -> Field {
    Field::new(NAME_FIELD, "ID", FieldType::Data)
        .with_required(true)
        .with_read_only(true)
}

/// Snapshot of mixin field lists taken before injection starts
#[derive(Debug, Default)]
pub struct MixinTemplates {
    fields: HashMap<MixinKind, Vec<Field>>,
}

impl MixinTemplates {
    pub fn capture(schemas: &SchemaSet) -> Self {
        let fields = MixinKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let schema = schemas.get(kind.schema_name())?;
                (!schema.fields.is_empty()).then(|| (kind, schema.fields.clone()))
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, kind: MixinKind) -> Option<&[Field]> {
        self.fields.get(&kind).map(Vec::as_slice)
    }
}

/// Synthesized prefix for one schema, every field marked `meta`
pub fn meta_fields_for(schema: &Schema, templates: &MixinTemplates, diagnostics: &mut Diagnostics) -> Vec<Field> {
    let mut fields = Vec::new();

    if !schema.is_random_named() && !schema.has_field(NAME_FIELD) {
        fields.push(identity_field());
    }

    for kind in MixinKind::for_schema(schema) {
        match templates.get(kind) {
            Some(template) => fields.extend(template.iter().cloned()),
            None => diagnostics.mixin_missing(&schema.name, kind.schema_name()),
        }
    }

    for field in &mut fields {
        field.meta = true;
    }
    fields
}

/// Inject meta fields into every schema of the set
pub fn inject_meta_fields(schemas: &mut SchemaSet, diagnostics: &mut Diagnostics) {
    let templates = MixinTemplates::capture(schemas);

    for (name, schema) in schemas.iter_mut() {
        // Templates keep their own declared fields only.
        if MixinKind::from_schema_name(name).is_some() {
            continue;
        }

        let synthesized = meta_fields_for(schema, &templates, diagnostics);
        let prefix = reconcile(schema, synthesized, diagnostics);
        trace!(schema = %name, injected = prefix.len(), "injected meta fields");

        let authored = std::mem::take(&mut schema.fields);
        schema.fields = prefix;
        schema.fields.extend(authored);
    }
}

/// Drop synthesized duplicates and let declared fields shadow synthesized ones.
///
/// A declared field with `remove` set passes the flag on to the synthesized
/// field it shadows, so the pruner drops both.
fn reconcile(schema: &Schema, synthesized: Vec<Field>, diagnostics: &mut Diagnostics) -> Vec<Field> {
    let declared: HashMap<&str, bool> = schema
        .fields
        .iter()
        .map(|f| (f.fieldname.as_str(), f.remove))
        .collect();
    let mut seen = HashSet::new();
    let mut prefix = Vec::with_capacity(synthesized.len());

    for mut field in synthesized {
        if !seen.insert(field.fieldname.clone()) {
            continue;
        }
        match declared.get(field.fieldname.as_str()) {
            Some(true) => {
                field.remove = true;
                prefix.push(field);
            }
            Some(false) => diagnostics.meta_field_shadowed(&schema.name, &field.fieldname),
            None => prefix.push(field),
        }
    }
    prefix
}
