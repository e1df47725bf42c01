//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisClientConfig, ProgressConfig};
use crate::upload::{CompressorConfig, ImageCompressor, ImageValidator, MIB};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Palm analysis API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Client settings for this API
    pub fn client_config(&self) -> AnalysisClientConfig {
        AnalysisClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_secs * 1000,
        }
    }
}

/// Upload validation and compression configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,

    #[serde(default = "default_compress_threshold")]
    pub compress_threshold_bytes: u64,

    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_max_upload() -> u64 {
    10 * MIB
}

fn default_compress_threshold() -> u64 {
    MIB
}

fn default_max_dimension() -> u32 {
    1200
}

fn default_jpeg_quality() -> u8 {
    80
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload(),
            compress_threshold_bytes: default_compress_threshold(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl ImageConfig {
    pub fn validator(&self) -> ImageValidator {
        ImageValidator::new(self.max_upload_bytes)
    }

    pub fn compressor(&self) -> ImageCompressor {
        ImageCompressor::new(CompressorConfig {
            threshold_bytes: self.compress_threshold_bytes,
            max_dimension: self.max_dimension,
            quality: self.jpeg_quality.clamp(1, 100),
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("mystiview").join("config.toml")),
            Some(PathBuf::from("./mystiview.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(url) = std::env::var("MYSTIVIEW_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("MYSTIVIEW_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.api.request_timeout_secs = t;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("MYSTIVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MYSTIVIEW_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# MystiView Configuration
#
# Environment variables override these settings:
# - MYSTIVIEW_API_BASE_URL
# - MYSTIVIEW_REQUEST_TIMEOUT_SECS
# - MYSTIVIEW_LOG_LEVEL
# - MYSTIVIEW_LOG_FORMAT

[api]
# Base URL of the palm reading API
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 60

[image]
# Largest accepted upload (bytes)
max_upload_bytes = 10485760

# Images above this size are downscaled and re-encoded (bytes)
compress_threshold_bytes = 1048576

# Longest side after downscaling (pixels)
max_dimension = 1200

# JPEG quality for re-encoded images (1-100)
jpeg_quality = 80

[progress]
# Percentage added per tick while waiting for the reading
step = 10

# Progress never passes this value before the reading arrives
cap = 90

# Time between ticks (ms)
interval_ms = 500

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
