//! Error types for schema loading and the frozen schema map

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema engine errors
///
/// The build pipeline itself never fails. Errors come from loading static
/// declarations and from attempts to mutate a frozen map.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema not found: {name}")]
    NotFound { name: String },

    #[error("Invalid schema declaration in {path}: {reason}")]
    InvalidDeclaration { path: PathBuf, reason: String },

    #[error("Duplicate field '{fieldname}' declared on schema {schema}")]
    DuplicateField { schema: String, fieldname: String },

    #[error("Schema map is frozen: cannot {action} on {target}")]
    ImmutabilityViolation { action: &'static str, target: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn frozen(action: &'static str, target: impl Into<String>) -> Self {
        Self::ImmutabilityViolation {
            action,
            target: target.into(),
        }
    }

    /// Whether this error was raised by the freeze guard
    pub fn is_immutability_violation(&self) -> bool {
        matches!(self, Self::ImmutabilityViolation { .. })
    }
}
