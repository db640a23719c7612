//! Configuration management for the dashquery service.
//!
//! Settings are loaded from, in increasing order of precedence:
//! 1. Default configuration (embedded in binary)
//! 2. System-wide configuration file (`/etc/dashquery/config.toml`)
//! 3. User-specified configuration file
//! 4. Environment variables (prefixed with `DASHQUERY_`, nested keys
//!    separated by `__`)
//! 5. Command-line arguments (applied by the CLI handlers)

use crate::error::Result;
use crate::storage::duckdb::TABLE_SCHEMA_OPTION;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    /// Store holding component definitions
    pub manager: StoreConfig,
    /// Store holding the data queried by templates
    pub dashboard: DashboardStoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Allowed origins (`["*"]` allows any origin)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// DuckDB store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// File path or `:memory:`
    pub connection: String,
    /// DuckDB settings passed through on open
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// Dashboard data store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStoreConfig {
    pub connection: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
    /// Schema listed by the table listing endpoint
    #[serde(default = "default_table_schema")]
    pub table_schema: String,
}

impl DashboardStoreConfig {
    /// Backend options including the table schema.
    pub fn backend_options(&self) -> HashMap<String, String> {
        let mut options = self.options.clone();
        options.insert(TABLE_SCHEMA_OPTION.to_owned(), self.table_schema.clone());
        options
    }
}

/// Query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Time window used for chart requests that omit a time range
    #[serde(default = "default_window_hours")]
    pub default_window_hours: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_window_hours: default_window_hours(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name("/etc/dashquery/config.toml").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DASHQUERY")
                .prefix_separator("_")
                .separator("__"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_table_schema() -> String {
    "main".to_owned()
}

fn default_window_hours() -> u32 {
    24
}
