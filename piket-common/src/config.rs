//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `PIKET_ROOT_FOLDER`
//! 3. `root_folder` key in the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never stops startup: defaults are used
//! and a warning is logged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PIKET_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "piket.db";

/// Longest allowed session lifetime (one leap year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

/// Widest recap range a client may request (ten years)
pub const MAX_RECAP_DAYS_LIMIT: i64 = 3660;

/// Server settings read from `config.toml`
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub root_folder: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    /// Label of the shared duty group
    pub communal_group: String,
    /// Password applied by the admin reset-password action
    pub default_password: String,
    pub session_ttl_hours: i64,
    pub max_recap_days: i64,
    /// Superadmin created on first start when none exists
    pub admin_username: String,
    pub admin_password: String,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            host: "127.0.0.1".to_string(),
            port: 5780,
            api_prefix: "/api".to_string(),
            communal_group: "Piket Bersama".to_string(),
            default_password: "password123".to_string(),
            session_ttl_hours: 12,
            max_recap_days: 366,
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse from TOML text and validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.communal_group.trim().is_empty() {
            return Err(Error::Config("communal_group must not be empty".into()));
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(Error::Config(format!(
                "session_ttl_hours must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )));
        }
        if !(1..=MAX_RECAP_DAYS_LIMIT).contains(&self.max_recap_days) {
            return Err(Error::Config(format!(
                "max_recap_days must be between 1 and {}",
                MAX_RECAP_DAYS_LIMIT
            )));
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(Error::Config(format!(
                "api_prefix must start with '/': {}",
                self.api_prefix
            )));
        }
        if self.api_prefix.ends_with('/') {
            return Err(Error::Config(format!(
                "api_prefix must not end with '/': {}",
                self.api_prefix
            )));
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Default config file location for the platform (`<config dir>/piket/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("piket").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("piket"))
        .unwrap_or_else(|| PathBuf::from("./piket_data"))
}

/// Resolves the root folder from the four sources in priority order
#[derive(Debug, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    config_file_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_config(mut self, config: &ServerConfig) -> Self {
        self.config_file_value = config.root_folder.clone();
        self
    }

    /// Resolve the root folder
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.config_file_value {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "127.0.0.1:5780");
        assert_eq!(config.communal_group, "Piket Bersama");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str("port = 9000\ncommunal_group = \"Semua\"\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.communal_group, "Semua");
        assert_eq!(config.default_password, "password123");
        assert_eq!(config.max_recap_days, 366);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ServerConfig::from_toml_str("session_ttl_hours = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("max_recap_days = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("api_prefix = \"api\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("api_prefix = \"/api/\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("port = \"eighty\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_empty_prefix_allowed() {
        let config = ServerConfig::from_toml_str("api_prefix = \"\"").unwrap();
        assert_eq!(config.api_prefix, "");
    }

    #[test]
    fn test_database_path() {
        let init = RootFolderInitializer::new(PathBuf::from("/tmp/piket-x"));
        assert_eq!(init.database_path(), PathBuf::from("/tmp/piket-x/piket.db"));
    }
}
