//! Configuration management for plotweb
//!
//! This module handles loading, validation, and management of
//! plotweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Basic authentication (optional)
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Basic authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the registry data directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Registry snapshot file name
    #[serde(default = "default_registry_file")]
    pub registry_file: String,
    /// Persist the registry after every mutating operation
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            registry_file: default_registry_file(),
            autosave: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_registry_file() -> String {
    "registry.json".to_string()
}

/// Registry import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Default import mode: "merge" or "replace"
    #[serde(default = "default_import_mode")]
    pub default_mode: SyncMode,
    /// Password assigned to accounts synthesized during import
    #[serde(default = "default_password")]
    pub default_password: String,
    /// Domain used for placeholder member emails
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_mode: SyncMode::Merge,
            default_password: default_password(),
            email_domain: default_email_domain(),
        }
    }
}

fn default_import_mode() -> SyncMode {
    SyncMode::Merge
}

fn default_password() -> String {
    "password123".to_string()
}

fn default_email_domain() -> String {
    "portal.local".to_string()
}

/// Import mode enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Key-based upsert into the existing registry
    Merge,
    /// Wholly replace the existing registry
    Replace,
}

impl Default for SyncMode {
    fn default() -> Self {
        SyncMode::Merge
    }
}

impl std::str::FromStr for SyncMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" | "upsert" => Ok(SyncMode::Merge),
            "replace" | "wipe" => Ok(SyncMode::Replace),
            _ => Err(format!("Invalid sync mode: {}", s)),
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Merge => write!(f, "merge"),
            SyncMode::Replace => write!(f, "replace"),
        }
    }
}

/// Feature toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Number of recent receipts included in assistant snapshots
    #[serde(default = "default_snapshot_receipts")]
    pub snapshot_receipts: usize,
    /// Enable the notices endpoints
    #[serde(default = "default_true")]
    pub notices_enable: bool,
    /// Enable the messaging endpoints
    #[serde(default = "default_true")]
    pub messages_enable: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            snapshot_receipts: default_snapshot_receipts(),
            notices_enable: true,
            messages_enable: true,
        }
    }
}

fn default_snapshot_receipts() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for lists
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    50
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Registry import settings
    #[serde(default)]
    pub import: ImportConfig,
    /// Feature toggles
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        // Try to parse the YAML
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate port
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        // Validate snapshot receipt count
        if self.features.snapshot_receipts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "features.snapshot_receipts".to_string(),
                reason: "Snapshot receipt count must be greater than 0".to_string(),
            });
        }

        // Validate pagination
        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Records per page must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full path to the registry snapshot file
    pub fn registry_path(&self) -> PathBuf {
        self.data.path.join(&self.data.registry_file)
    }
}
