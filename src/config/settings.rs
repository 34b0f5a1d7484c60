//! TOML-based configuration for catalog-search.
//!
//! Supports a config file (catalog-search.toml) with environment variable
//! expansion in connection paths.
//!
//! Example configuration:
//! ```toml
//! [connections.warehouse]
//! path = "${CATALOG_HOME}/warehouse"
//! default_schema = "SALES"
//! data_source = "DWPROD"
//!
//! [search]
//! max_results = 200
//! fetch_size = 500
//!
//! [filters]
//! include_schemas = ["SALES", "HR%"]
//! exclude_schemas = ["SYS%"]
//!
//! [snapshot]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{LoadError, SchemaFilter};
use crate::search::DEFAULT_MAX_RESULTS;
use crate::session::METADATA_FETCH_SIZE;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CATALOG_SEARCH_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("No connections configured")]
    NoConnections,

    #[error("Invalid schema filter: {0}")]
    InvalidFilter(#[from] LoadError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named catalog connections.
    pub connections: BTreeMap<String, ConnectionSettings>,

    pub search: SearchSettings,

    pub filters: FilterSettings,

    pub snapshot: SnapshotSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Directory holding the catalog databases (supports ${ENV_VAR} expansion).
    pub path: String,

    /// Schema searched when no scope is given.
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Name reported in errors; defaults to the connection name.
    #[serde(default)]
    pub data_source: Option<String>,
}

impl ConnectionSettings {
    /// Get the catalog directory with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        Ok(PathBuf::from(expand_env_vars(&self.path)?))
    }

    pub fn data_source_name<'a>(&'a self, connection: &'a str) -> &'a str {
        self.data_source.as_deref().unwrap_or(connection)
    }
}

/// Search defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_results: usize,

    /// Rows fetched per round trip.
    pub fetch_size: u32,

    pub case_sensitive: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            fetch_size: METADATA_FETCH_SIZE,
            case_sensitive: false,
        }
    }
}

/// Schema include/exclude patterns applied when loading a catalog.
///
/// Patterns use `LIKE` syntax (`%` and `_`) and match case-insensitively.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterSettings {
    pub include_schemas: Vec<String>,
    pub exclude_schemas: Vec<String>,
}

impl FilterSettings {
    pub fn schema_filter(&self) -> Result<SchemaFilter, SettingsError> {
        Ok(SchemaFilter::new(
            &self.include_schemas,
            &self.exclude_schemas,
        )?)
    }
}

/// Snapshot store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub enabled: bool,

    /// Store location; `~/.catalog-search/snapshots.db` when unset.
    pub path: Option<String>,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl SnapshotSettings {
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CATALOG_SEARCH_CONFIG`
    /// 2. `./catalog-search.toml`
    /// 3. `~/.config/catalog-search/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("catalog-search.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("catalog-search").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.search.max_results == 0 {
            return Err(SettingsError::InvalidConfig(
                "search.max_results must be positive".to_string(),
            ));
        }
        if self.search.fetch_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "search.fetch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else the first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    /// The named connection, or the default one when no name is given.
    pub fn connection(
        &self,
        name: Option<&str>,
    ) -> Result<(String, &ConnectionSettings), SettingsError> {
        match name {
            Some(name) => Ok((name.to_string(), self.get_connection(name)?)),
            None => self
                .default_connection()
                .map(|(name, conn)| (name.to_string(), conn))
                .ok_or(SettingsError::NoConnections),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
