//! Field definitions
//!
//! A [`Field`] describes one attribute of a document schema. Author-declared
//! fields come from the static declarations; meta fields are synthesized by
//! the build pipeline and custom fields arrive at build time from the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldType {
    #[default]
    Data,
    Select,
    Link,
    Date,
    Datetime,
    Table,
    AutoComplete,
    Check,
    AttachImage,
    DynamicLink,
    Int,
    Float,
    Currency,
    Text,
    Color,
    Button,
    Attachment,
}

impl FieldType {
    /// Field types whose values come from a fixed option list
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::AutoComplete)
    }

    /// Field types that point at another schema
    pub fn is_link_like(&self) -> bool {
        matches!(self, FieldType::Link | FieldType::Table | FieldType::DynamicLink)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Data => "Data",
            FieldType::Select => "Select",
            FieldType::Link => "Link",
            FieldType::Date => "Date",
            FieldType::Datetime => "Datetime",
            FieldType::Table => "Table",
            FieldType::AutoComplete => "AutoComplete",
            FieldType::Check => "Check",
            FieldType::AttachImage => "AttachImage",
            FieldType::DynamicLink => "DynamicLink",
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::Currency => "Currency",
            FieldType::Text => "Text",
            FieldType::Color => "Color",
            FieldType::Button => "Button",
            FieldType::Attachment => "Attachment",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One entry of a select-like field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Option whose label mirrors its value
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// A single field of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Identifier, unique within a composed schema
    pub fieldname: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub fieldtype: FieldType,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Linked schema for Link and Table fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Sibling field holding the schema name of a DynamicLink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Marks the field for deletion by the pruner
    #[serde(default, skip_serializing_if = "is_false")]
    pub remove: bool,

    /// Synthesized by the build pipeline rather than declared
    #[serde(default, skip_serializing_if = "is_false")]
    pub meta: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_custom: bool,

    /// Owning schema, assigned during composition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_label: Option<String>,
}

impl Field {
    pub fn new(fieldname: impl Into<String>, label: impl Into<String>, fieldtype: FieldType) -> Self {
        Self {
            fieldname: fieldname.into(),
            label: label.into(),
            fieldtype,
            ..Self::default()
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = values.into_iter().map(SelectOption::same).collect();
        self
    }

    /// A bare declaration that only asks the pruner to drop `fieldname`
    pub fn removal(fieldname: impl Into<String>) -> Self {
        Self {
            fieldname: fieldname.into(),
            remove: true,
            ..Self::default()
        }
    }

    /// Whether this field came from the author-declared layers
    pub fn is_authored(&self) -> bool {
        !self.meta && !self.is_custom
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
