//! Schema-Name Stamper
//!
//! Denormalizes ownership onto fields so a field alone can be traced back to
//! its schema without the map.

use crate::field::Field;
use crate::layers::SchemaSet;

/// Set `schema_name`/`schema_label` on every field. Idempotent.
pub fn stamp_schema_names(schemas: &mut SchemaSet) {
    for (name, schema) in schemas.iter_mut() {
        let label = schema.label.clone();
        for field in &mut schema.fields {
            stamp_field(field, name, &label);
        }
    }
}

pub(crate) fn stamp_field(field: &mut Field, schema_name: &str, schema_label: &str) {
    field.schema_name = Some(schema_name.to_string());
    field.schema_label = Some(schema_label.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::schema::Schema;

    #[test]
    fn test_stamps_map_key_and_label() {
        let schema = Schema::new("SalesInvoice", "Sales Invoice")
            .with_field(Field::new("date", "Date", FieldType::Date))
            .with_field(Field::new("party", "Customer", FieldType::Link));
        let mut schemas: SchemaSet = [("SalesInvoice".to_string(), schema)].into_iter().collect();

        stamp_schema_names(&mut schemas);
        let once = schemas.clone();
        stamp_schema_names(&mut schemas);

        assert_eq!(once, schemas);
        for field in schemas["SalesInvoice"].fields() {
            assert_eq!(field.schema_name.as_deref(), Some("SalesInvoice"));
            assert_eq!(field.schema_label.as_deref(), Some("Sales Invoice"));
        }
    }
}
