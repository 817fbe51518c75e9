//! Configuration for the schema engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (books-schemas.toml)
//! - Environment variables (BOOKS_SCHEMAS__*)
//!
//! ## Example config file (books-schemas.toml):
//! ```toml
//! [build]
//! mode = "development"
//! country_code = "in"
//!
//! [registry]
//! schema_dir = "./schemas"
//! custom_fields = "./custom-fields.json"
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::layers::LayerRegistry;
use crate::pipeline::{BuildMode, RawCustomField};
use crate::schema::NO_REGION;

/// Main configuration for the schema engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Where declarations and custom fields come from
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output settings for the CLI
    #[serde(default)]
    pub output: OutputConfig,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Development freezes the map, production skips it
    #[serde(default)]
    pub mode: BuildMode,

    /// Country code of the regional layer, "-" for none
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Declaration tree on disk; the embedded tree is used when unset
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    /// JSON array of custom-field records
    #[serde(default)]
    pub custom_fields: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_country_code() -> String {
    NO_REGION.to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::default(),
            country_code: default_country_code(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "books-schemas.toml",
            ".books-schemas.toml",
            "config/books-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "books", "books-schemas") {
            let xdg_config = config_dir.config_dir().join("books-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("BOOKS_SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }

    /// Registry from `registry.schema_dir`, or the embedded declarations
    pub fn load_registry(&self) -> Result<LayerRegistry> {
        match &self.registry.schema_dir {
            Some(dir) => LayerRegistry::from_directory(dir),
            None => LayerRegistry::embedded(),
        }
    }

    /// Custom-field records from `registry.custom_fields`, empty when unset
    pub fn load_custom_fields(&self) -> Result<Vec<RawCustomField>> {
        match &self.registry.custom_fields {
            Some(path) => read_custom_fields(path),
            None => Ok(Vec::new()),
        }
    }
}

/// Read a JSON array of custom-field records
pub fn read_custom_fields(path: impl AsRef<std::path::Path>) -> Result<Vec<RawCustomField>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
