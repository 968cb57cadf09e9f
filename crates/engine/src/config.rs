//! Engine configuration via `tabula.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! a working configuration. Values are validated eagerly on load.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tabula_core::limits::{DEFAULT_CHANGE_PAGE_SIZE, DEFAULT_MAX_CONTAINERS_PER_VIEW};
use tabula_core::{Error, Limits, Result, TableType};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tabula.toml";

fn default_max_containers_per_view() -> usize {
    DEFAULT_MAX_CONTAINERS_PER_VIEW
}

fn default_change_page_size() -> usize {
    DEFAULT_CHANGE_PAGE_SIZE
}

fn default_unsupported_table_types() -> Vec<String> {
    vec![TableType::MaterializedView.id().to_string()]
}

/// Engine configuration loaded from `tabula.toml`
///
/// # Example
///
/// ```toml
/// max_containers_per_view = 10000
/// change_page_size = 100
/// unsupported_table_types = ["materializedview"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// Upper bound on the size of a view's scope closure
    #[serde(default = "default_max_containers_per_view")]
    pub max_containers_per_view: usize,
    /// Page size used when iterating change logs
    #[serde(default = "default_change_page_size")]
    pub change_page_size: usize,
    /// Table type ids that do not accept updates
    #[serde(default = "default_unsupported_table_types")]
    pub unsupported_table_types: Vec<String>,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            max_containers_per_view: default_max_containers_per_view(),
            change_page_size: default_change_page_size(),
            unsupported_table_types: default_unsupported_table_types(),
        }
    }
}

impl TabulaConfig {
    /// Limits derived from this config
    pub fn limits(&self) -> Limits {
        Limits {
            max_containers_per_view: self.max_containers_per_view,
            change_page_size: self.change_page_size,
        }
    }

    /// Parse `unsupported_table_types` into table types
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an unknown type id.
    pub fn unsupported_types(&self) -> Result<Vec<TableType>> {
        self.unsupported_table_types
            .iter()
            .map(|id| {
                TableType::from_id(id.trim()).ok_or_else(|| {
                    Error::configuration(format!(
                        "unknown table type '{}' in unsupported_table_types",
                        id
                    ))
                })
            })
            .collect()
    }

    /// Check every field
    pub fn validate(&self) -> Result<()> {
        self.limits().validate()?;
        self.unsupported_types()?;
        Ok(())
    }

    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# Tabula engine configuration

# Maximum number of containers a view's scope closure may contain.
# Resolution fails with LimitExceeded beyond this.
max_containers_per_view = 10000

# Number of change records fetched per page when iterating a change log.
change_page_size = 100

# Table types that do not accept updates.
# Known types: table, entityview, submissionview, dataset,
# datasetcollection, materializedview, virtualtable
unsupported_table_types = ["materializedview"]
"#
    }

    /// Read, parse, and validate config from `path`
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Configuration` if it
    /// does not parse or validate.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: TabulaConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!("failed to parse config file '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Io(io::Error::new(
                    e.kind(),
                    format!("failed to write default config file '{}': {}", path.display(), e),
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("failed to write config file '{}': {}", path.display(), e),
            ))
        })
    }
}
