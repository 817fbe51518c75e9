//! Custom Field Merger
//!
//! Folds runtime-defined fields from the custom-field store into the map.
//! Declared and meta fields always win a name collision, and among custom
//! fields the earliest record for a schema wins. Anything that cannot be
//! attached is skipped, never raised.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::stamp::stamp_field;
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::field::{Field, FieldType, SelectOption};
use crate::layers::SchemaSet;

/// A flat custom-field record as stored outside the static declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomField {
    /// Name of the schema the field is added to
    pub parent: String,
    pub fieldname: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fieldtype: FieldType,
    /// Newline-delimited option values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// Stored as a number or a boolean depending on the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
}

impl RawCustomField {
    pub fn new(
        parent: impl Into<String>,
        fieldname: impl Into<String>,
        label: impl Into<String>,
        fieldtype: FieldType,
    ) -> Self {
        Self {
            parent: parent.into(),
            fieldname: fieldname.into(),
            label: label.into(),
            fieldtype,
            options: None,
            is_required: None,
            default: None,
            target: None,
            references: None,
            section: None,
            tab: None,
        }
    }

    /// Build the field to attach, omitting malformed attributes
    pub fn to_field(&self, diagnostics: &mut Diagnostics) -> Field {
        let mut field = Field::new(self.fieldname.clone(), self.label.clone(), self.fieldtype);
        field.section = self.section.clone();
        field.tab = self.tab.clone();
        field.is_custom = true;

        if let Some(raw) = self.options.as_deref() {
            field.options = parse_options(raw);
        }

        if let Some(value) = &self.is_required {
            match normalize_required(value) {
                Some(required) => field.required = required,
                None => diagnostics.malformed(DiagnosticCode::MalformedRequired, &self.parent, &self.fieldname, value),
            }
        }

        field.target = self.string_attr(&self.target, DiagnosticCode::MalformedTarget, diagnostics);
        field.references = self.string_attr(&self.references, DiagnosticCode::MalformedReferences, diagnostics);

        if field.required {
            field.default = self.default.clone().filter(|v| !v.is_null());
        }
        field
    }

    fn string_attr(&self, value: &Option<Value>, code: DiagnosticCode, diagnostics: &mut Diagnostics) -> Option<String> {
        match value.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => {
                diagnostics.malformed(code, &self.parent, &self.fieldname, other);
                None
            }
        }
    }
}

/// Split newline-delimited options into trimmed `{value, label}` pairs
pub fn parse_options(raw: &str) -> Vec<SelectOption> {
    raw.split('\n')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(SelectOption::same)
        .collect()
}

/// Numbers are true when non-zero; anything other than a number or boolean is ambiguous
pub fn normalize_required(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
        _ => None,
    }
}

/// Append custom fields to their parent schemas in input order
pub fn merge_custom_fields(schemas: &mut SchemaSet, raw_fields: &[RawCustomField], diagnostics: &mut Diagnostics) -> usize {
    let mut taken: HashMap<&str, HashSet<String>> = HashMap::new();
    let mut merged = 0;

    for raw in raw_fields {
        let Some(schema) = schemas.get_mut(&raw.parent) else {
            diagnostics.parent_missing(&raw.parent, &raw.fieldname);
            continue;
        };
        if raw.fieldname.trim().is_empty() {
            diagnostics.blank_fieldname(&raw.parent);
            continue;
        }

        let names = taken
            .entry(raw.parent.as_str())
            .or_insert_with(|| schema.fields.iter().map(|f| f.fieldname.clone()).collect());
        if !names.insert(raw.fieldname.clone()) {
            diagnostics.collision(&raw.parent, &raw.fieldname);
            continue;
        }

        let mut field = raw.to_field(diagnostics);
        stamp_field(&mut field, &raw.parent, &schema.label);
        schema.fields.push(field);
        merged += 1;
    }

    tracing::debug!(merged, skipped = raw_fields.len() - merged, "merged custom fields");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn schemas() -> SchemaSet {
        let party = Schema::new("Party", "Party").with_field(Field::new("email", "Email", FieldType::Data));
        [("Party".to_string(), party)].into_iter().collect()
    }

    #[test]
    fn test_parse_options_drops_blank_lines() {
        let options = parse_options("A\nB\n \n");
        assert_eq!(options, vec![SelectOption::same("A"), SelectOption::same("B")]);
        assert!(parse_options("").is_empty());
        assert_eq!(parse_options("  Low \r\nHigh"), vec![SelectOption::same("Low"), SelectOption::same("High")]);
    }

    #[test]
    fn test_normalize_required() {
        assert_eq!(normalize_required(&json!(1)), Some(true));
        assert_eq!(normalize_required(&json!(0)), Some(false));
        assert_eq!(normalize_required(&json!(true)), Some(true));
        assert_eq!(normalize_required(&json!("yes")), None);
        assert_eq!(normalize_required(&Value::Null), None);
    }

    #[test]
    fn test_to_field_attributes() {
        let mut raw = RawCustomField::new("Party", "tier", "Tier", FieldType::Select);
        raw.options = Some("Gold\nSilver\n".to_string());
        raw.is_required = Some(json!(1));
        raw.default = Some(json!("Silver"));
        raw.section = Some("Loyalty".to_string());

        let field = raw.to_field(&mut Diagnostics::new());

        assert!(field.is_custom);
        assert!(field.required);
        assert!(!field.meta);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.default, Some(json!("Silver")));
        assert_eq!(field.section.as_deref(), Some("Loyalty"));
    }

    #[test]
    fn test_default_only_when_required() {
        let mut raw = RawCustomField::new("Party", "note", "Note", FieldType::Data);
        raw.default = Some(json!("n/a"));
        assert_eq!(raw.to_field(&mut Diagnostics::new()).default, None);

        raw.is_required = Some(json!(false));
        assert_eq!(raw.to_field(&mut Diagnostics::new()).default, None);
    }

    #[test]
    fn test_malformed_attributes_omitted() {
        let mut raw = RawCustomField::new("Party", "region", "Region", FieldType::Link);
        raw.is_required = Some(json!("true"));
        raw.target = Some(json!(42));
        raw.references = Some(json!(["Party"]));
        raw.default = Some(json!("North"));
        let mut diagnostics = Diagnostics::new();

        let field = raw.to_field(&mut diagnostics);

        assert!(!field.required);
        assert_eq!(field.target, None);
        assert_eq!(field.references, None);
        assert_eq!(field.default, None);
        assert_eq!(diagnostics.warning_count(), 3);
    }

    #[test]
    fn test_declared_field_wins_collision() {
        let mut schemas = schemas();
        let mut custom_email = RawCustomField::new("Party", "email", "Work Email", FieldType::Data);
        custom_email.is_required = Some(json!(true));

        let merged = merge_custom_fields(&mut schemas, &[custom_email], &mut Diagnostics::new());

        assert_eq!(merged, 0);
        let party = &schemas["Party"];
        assert_eq!(party.fields().len(), 1);
        assert_eq!(party.field("email").unwrap().label, "Email");
        assert!(!party.field("email").unwrap().is_custom);
    }

    #[test]
    fn test_earliest_custom_field_wins() {
        let mut schemas = schemas();
        let raw = vec![
            RawCustomField::new("Party", "tier", "Tier", FieldType::Data),
            RawCustomField::new("Party", "vip", "VIP", FieldType::Check),
            RawCustomField::new("Party", "tier", "Second Tier", FieldType::Int),
        ];
        let mut diagnostics = Diagnostics::new();

        merge_custom_fields(&mut schemas, &raw, &mut diagnostics);

        let party = &schemas["Party"];
        assert_eq!(party.fieldnames().collect::<Vec<_>>(), vec!["email", "tier", "vip"]);
        assert_eq!(party.field("tier").unwrap().label, "Tier");
        assert_eq!(diagnostics.with_code(DiagnosticCode::CustomFieldCollision).count(), 1);
    }

    #[test]
    fn test_missing_parent_skipped() {
        let mut schemas = schemas();
        let raw = vec![RawCustomField::new("Ghost", "color", "Color", FieldType::Color)];
        let mut diagnostics = Diagnostics::new();

        assert_eq!(merge_custom_fields(&mut schemas, &raw, &mut diagnostics), 0);
        assert!(!schemas.contains_key("Ghost"));
        assert_eq!(diagnostics.with_code(DiagnosticCode::CustomFieldParentMissing).count(), 1);
    }

    #[test]
    fn test_blank_fieldname_skipped() {
        let mut schemas = schemas();
        let raw = vec![
            RawCustomField::new("Party", "", "Nameless", FieldType::Data),
            RawCustomField::new("Party", "   ", "Blank", FieldType::Data),
            RawCustomField::new("Party", "tier", "Tier", FieldType::Data),
        ];
        let mut diagnostics = Diagnostics::new();

        assert_eq!(merge_custom_fields(&mut schemas, &raw, &mut diagnostics), 1);
        assert!(schemas["Party"].fieldnames().all(|n| !n.trim().is_empty()));
        assert_eq!(schemas["Party"].fieldnames().collect::<Vec<_>>(), vec!["email", "tier"]);
        assert_eq!(diagnostics.with_code(DiagnosticCode::MalformedFieldname).count(), 2);
        assert_eq!(diagnostics.with_code(DiagnosticCode::CustomFieldCollision).count(), 0);
    }

    #[test]
    fn test_custom_fields_stamped() {
        let mut schemas = schemas();
        let raw = vec![RawCustomField::new("Party", "tier", "Tier", FieldType::Data)];

        merge_custom_fields(&mut schemas, &raw, &mut Diagnostics::new());

        let tier = schemas["Party"].field("tier").unwrap();
        assert_eq!(tier.schema_name.as_deref(), Some("Party"));
        assert_eq!(tier.schema_label.as_deref(), Some("Party"));
    }

    #[test]
    fn test_raw_record_deserialize() {
        let raw: RawCustomField = serde_json::from_value(json!({
            "parent": "Item",
            "fieldname": "hsnCode",
            "label": "HSN Code",
            "fieldtype": "Data",
            "isRequired": 0,
            "target": null
        }))
        .unwrap();

        assert_eq!(raw.is_required, Some(json!(0)));
        assert_eq!(raw.target, None);
        assert!(!raw.to_field(&mut Diagnostics::new()).required);
    }
}
