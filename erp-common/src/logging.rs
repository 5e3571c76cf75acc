//! Standardized logging configuration for the ERP backend.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Standard tracing filter (e.g., `info`, `erp_server=debug`)
//! - `LOG_FORMAT`: Output format: `pretty` (default), `compact`, or `json`
//! - `LOG_LEVEL`: Default level when `RUST_LOG` is not set
//! - `LOG_LOCATION`: true/false for file:line info
//!
//! # Usage
//!
//! ```rust,ignore
//! use erp_common::logging::{init_logging, LogConfig};
//!
//! init_logging(LogConfig::from_env())?;
//! ```

use std::env;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with colors (default for terminals)
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for log aggregation
    Json,
}

impl LogFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format (pretty, compact, json)
    pub format: LogFormat,
    /// Default log level filter
    pub default_level: String,
    /// Include source file location
    pub include_location: bool,
    /// Include target (module path)
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_level: "info".to_string(),
            include_location: true,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            include_location: env::var("LOG_LOCATION")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(true),
            include_target: true,
        }
    }

    /// Create config for JSON output
    pub fn json() -> Self {
        Self {
            format: LogFormat::Json,
            ..Default::default()
        }
    }

    /// Create config for compact output (ideal for production)
    pub fn compact() -> Self {
        Self {
            format: LogFormat::Compact,
            include_location: false,
            ..Default::default()
        }
    }

    /// Set the default log level
    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Initialize logging with the given configuration
///
/// # Errors
///
/// Returns an error if the subscriber cannot be initialized (e.g., already set)
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Build env filter from RUST_LOG or default
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let layer = fmt::layer()
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_level(true);

    match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init()?,
        LogFormat::Compact => registry.with(layer.compact()).try_init()?,
        LogFormat::Pretty => registry.with(layer).try_init()?,
    }

    Ok(())
}
