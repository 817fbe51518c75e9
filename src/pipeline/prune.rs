//! Field Pruner
//!
//! Drops every field flagged `remove`, declared or synthesized. Runs after
//! injection and before stamping so pruned fields never get back-references.

use tracing::trace;

use crate::layers::SchemaSet;

/// Remove flagged fields; returns how many were dropped
pub fn prune_removed_fields(schemas: &mut SchemaSet) -> usize {
    let mut pruned = 0;
    for (name, schema) in schemas.iter_mut() {
        let before = schema.fields.len();
        schema.fields.retain(|f| !f.remove);
        let dropped = before - schema.fields.len();
        if dropped > 0 {
            trace!(schema = %name, dropped, "pruned removed fields");
        }
        pruned += dropped;
    }
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use crate::schema::Schema;

    #[test]
    fn test_prunes_declared_and_meta_fields() {
        let mut injected = Field::new("modified", "Modified", FieldType::Datetime);
        injected.meta = true;
        injected.remove = true;
        let schema = Schema::new("Setting", "Setting")
            .with_field(injected)
            .with_field(Field::new("value", "Value", FieldType::Text))
            .with_field(Field::removal("modified"));
        let mut schemas: SchemaSet = [("Setting".to_string(), schema)].into_iter().collect();

        assert_eq!(prune_removed_fields(&mut schemas), 2);
        assert_eq!(schemas["Setting"].fieldnames().collect::<Vec<_>>(), vec!["value"]);
    }

    #[test]
    fn test_nothing_to_prune() {
        let schema = Schema::new("Note", "Note").with_field(Field::new("body", "Body", FieldType::Text));
        let mut schemas: SchemaSet = [("Note".to_string(), schema)].into_iter().collect();

        assert_eq!(prune_removed_fields(&mut schemas), 0);
        assert_eq!(schemas["Note"].fields().len(), 1);
    }
}
