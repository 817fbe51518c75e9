//! Books Schema Engine
//!
//! Builds the complete, immutable map of document schemas the Books
//! application runs on. Static declarations come in four layers and are
//! merged in order, then decorated and sealed:
//!
//! ## Features
//!
//! - **Layered Declarations**: core mixins, meta bookkeeping, app documents
//!   and per-country overrides, embedded at compile time or read from disk
//! - **Meta Fields**: identity and mixin fields (Base, Child, Tree,
//!   Submittable) injected by schema flags, each schema getting its own copy
//! - **Custom Fields**: runtime-defined fields merged with lower precedence
//!   than declared ones
//! - **Frozen Output**: one shared `Arc<SchemaMap>` per build, with mutation
//!   rejected outside production builds
//!
//! ## Pipeline
//!
//! ```text
//! core + meta ──┐
//!               ├─► compose ─► inject ─► prune ─► stamp ─► custom fields ─► freeze
//! app + region ─┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use books_schemas::{LayerRegistry, SchemaBuilder};
//!
//! let registry = LayerRegistry::embedded()?;
//! let schemas = SchemaBuilder::new(&registry).country_code(Some("in")).build(&[]);
//! assert!(schemas.field("Party", "gstin").is_some());
//! # Ok::<(), books_schemas::SchemaError>(())
//! ```

pub mod checksum;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod layers;
pub mod pipeline;
pub mod schema;

pub use checksum::Checksum;
pub use config::EngineConfig;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Result, SchemaError};
pub use field::{Field, FieldType, SelectOption};
pub use layers::{LayerKind, LayerRegistry, SchemaSet};
pub use pipeline::{get_schemas, BuildMode, MixinKind, RawCustomField, SchemaBuilder};
pub use schema::{Naming, Schema, SchemaMap, NO_REGION};
