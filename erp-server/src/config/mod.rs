//! Application settings and configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,
    /// Database configuration
    pub database: DatabaseSettings,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthSettings,
    /// Listing pagination configuration
    #[serde(default)]
    pub pagination: PaginationSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Secret for signing access tokens
    #[serde(default = "default_access_secret")]
    pub access_secret: String,
    /// Secret for signing refresh tokens
    #[serde(default = "default_refresh_secret")]
    pub refresh_secret: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
    /// Email for the bootstrapped admin account
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Password for the bootstrapped admin account
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

fn default_access_secret() -> String {
    "change-me-access".to_string()
}

fn default_refresh_secret() -> String {
    "change-me-refresh".to_string()
}

fn default_access_ttl() -> i64 {
    3600 // 1 hour
}

fn default_refresh_ttl() -> i64 {
    86400 // 1 day
}

fn default_admin_email() -> String {
    "admin@erp.local".to_string()
}

fn default_admin_password() -> String {
    "admin1234".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            access_secret: default_access_secret(),
            refresh_secret: default_refresh_secret(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
        }
    }
}

/// Pagination settings for listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Page size when the request omits `limit`
    #[serde(default = "default_page_size")]
    pub default_limit: u64,
    /// Hard cap on requested page size
    #[serde(default = "default_max_page_size")]
    pub max_limit: u64,
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_page_size(),
            max_limit: default_max_page_size(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_prefix("ERP")
    }

    /// Load settings with a custom environment variable prefix
    pub fn load_with_prefix(env_prefix: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = Self::config_dir();

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Add environment-specific configuration
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Add local overrides (not checked into git)
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false))
            // Add environment variables (e.g., ERP__DATABASE__URL)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Get the configuration directory path
    fn config_dir() -> String {
        std::env::var("ERP_CONFIG_DIR").unwrap_or_else(|_| "config".into())
    }

    /// Create default settings (useful for testing)
    pub fn default_settings() -> Self {
        Settings {
            server: ServerSettings::default(),
            database: DatabaseSettings {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/erp".into()),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
            },
            auth: AuthSettings::default(),
            pagination: PaginationSettings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::default_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default_settings();
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.auth.access_ttl_secs, 3600);
        assert_eq!(settings.auth.refresh_ttl_secs, 86400);
        assert_eq!(settings.pagination.default_limit, 10);
    }

    #[test]
    fn test_bind_address() {
        let server = ServerSettings::default();
        assert_eq!(server.bind_address(), "0.0.0.0:8080");
    }
}
