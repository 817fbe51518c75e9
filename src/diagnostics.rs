//! Diagnostics
//!
//! The build pipeline never fails on missing or malformed optional input; it
//! skips it. Every skip is recorded here so callers that care (the admin UI,
//! the CLI) can show what was dropped and why.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing skipped input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Meta fields ===
    /// Schema flags ask for a mixin whose template is not loaded
    MixinMissing,
    /// Authored field replaced an injected field of the same name
    MetaFieldShadowed,

    // === Custom fields ===
    /// Custom field targets a schema absent from the map
    CustomFieldParentMissing,
    /// Custom field name already taken on its target schema
    CustomFieldCollision,
    /// `isRequired` was neither a number nor a boolean
    MalformedRequired,
    /// `target` was not a string
    MalformedTarget,
    /// `references` was not a string
    MalformedReferences,
    /// Custom field record has an empty or blank `fieldname`
    MalformedFieldname,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MixinMissing => "I001",
            Self::MetaFieldShadowed => "I002",
            Self::CustomFieldParentMissing => "W001",
            Self::CustomFieldCollision => "W002",
            Self::MalformedRequired => "W003",
            Self::MalformedTarget => "W004",
            Self::MalformedReferences => "W005",
            Self::MalformedFieldname => "W006",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MixinMissing | Self::MetaFieldShadowed => Severity::Info,

            Self::CustomFieldParentMissing
            | Self::CustomFieldCollision
            | Self::MalformedRequired
            | Self::MalformedTarget
            | Self::MalformedReferences
            | Self::MalformedFieldname => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Schema the skipped input belonged to
    pub schema_name: String,
    /// Field involved, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fieldname: Option<String>,
    pub code: DiagnosticCode,
    pub message: String,
}

impl DiagnosticItem {
    pub fn new(schema_name: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            fieldname: None,
            code,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, fieldname: impl Into<String>) -> Self {
        self.fieldname = Some(fieldname.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {} ({}", self.code, self.severity(), self.message, self.schema_name)?;
        if let Some(fieldname) = &self.fieldname {
            write!(f, ".{}", fieldname)?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        tracing::debug!(
            code = %item.code,
            schema = %item.schema_name,
            field = item.fieldname.as_deref().unwrap_or(""),
            "{}",
            item.message
        );
        self.items.push(item);
    }

    pub fn mixin_missing(&mut self, schema_name: &str, mixin: &str) {
        self.push(DiagnosticItem::new(
            schema_name,
            DiagnosticCode::MixinMissing,
            format!("mixin schema '{}' is not loaded; nothing injected", mixin),
        ));
    }

    pub fn meta_field_shadowed(&mut self, schema_name: &str, fieldname: &str) {
        self.push(
            DiagnosticItem::new(
                schema_name,
                DiagnosticCode::MetaFieldShadowed,
                "declared field replaces injected field",
            )
            .with_field(fieldname),
        );
    }

    pub fn parent_missing(&mut self, parent: &str, fieldname: &str) {
        self.push(
            DiagnosticItem::new(
                parent,
                DiagnosticCode::CustomFieldParentMissing,
                format!("custom field targets unknown schema '{}'", parent),
            )
            .with_field(fieldname),
        );
    }

    pub fn blank_fieldname(&mut self, parent: &str) {
        self.push(DiagnosticItem::new(
            parent,
            DiagnosticCode::MalformedFieldname,
            "custom field without fieldname; dropped",
        ));
    }

    pub fn collision(&mut self, parent: &str, fieldname: &str) {
        self.push(
            DiagnosticItem::new(
                parent,
                DiagnosticCode::CustomFieldCollision,
                "custom field name already taken; dropped",
            )
            .with_field(fieldname),
        );
    }

    pub fn malformed(&mut self, code: DiagnosticCode, parent: &str, fieldname: &str, value: &serde_json::Value) {
        self.push(
            DiagnosticItem::new(parent, code, format!("ignored malformed value {}", value)).with_field(fieldname),
        );
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        self.items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_by_code() {
        assert_eq!(DiagnosticCode::MixinMissing.severity(), Severity::Info);
        assert_eq!(DiagnosticCode::CustomFieldCollision.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::MalformedFieldname.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::MalformedFieldname.as_str(), "W006");
    }

    #[test]
    fn test_counts_and_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.mixin_missing("Account", "Tree");
        diagnostics.collision("Party", "email");
        diagnostics.parent_missing("Ghost", "color");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.warning_count(), 2);
        assert_eq!(diagnostics.with_code(DiagnosticCode::CustomFieldCollision).count(), 1);
    }

    #[test]
    fn test_display() {
        let item = DiagnosticItem::new("Party", DiagnosticCode::CustomFieldCollision, "dropped").with_field("email");
        assert_eq!(item.to_string(), "[W002] warning: dropped (Party.email)");
    }
}
