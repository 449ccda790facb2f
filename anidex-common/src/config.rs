//! Bootstrap configuration loading and root folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! Command-line and environment handling belongs to each binary (clap `env`
//! attributes); this module provides the TOML layer and the defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ANIDEX_ROOT_FOLDER";

/// Environment variable holding the species API key
pub const API_KEY_ENV: &str = "NINJA_API_KEY";

/// Default species metadata endpoint
pub const DEFAULT_SPECIES_API_URL: &str = "https://api.api-ninjas.com/v1/animals";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Directory name under the platform data directory
pub const DATA_DIR_NAME: &str = "anidex";

/// Root folder used when the platform has no data directory
pub const FALLBACK_ROOT_FOLDER: &str = "./anidex_data";

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; missing values fall through to defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Folder holding the database, media and model files
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// ONNX model file
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Class label table (`config.json` with `id2label`, or one label per line)
    #[serde(default)]
    pub labels_path: Option<PathBuf>,

    /// Species metadata endpoint
    #[serde(default)]
    pub species_api_url: Option<String>,

    /// Public origin used in returned URLs (e.g. `https://anidex.example.org`)
    #[serde(default)]
    pub public_url: Option<String>,

    /// Species metadata API key
    #[serde(default)]
    pub ninja_api_key: Option<String>,

    /// Persist an `animals` record for every successful upload
    #[serde(default)]
    pub record_uploads: Option<bool>,

    /// Maximum accepted request body size in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

/// Default TOML config location: `<config_dir>/anidex/anidex.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("anidex").join("anidex.toml"))
}

/// Load the TOML bootstrap configuration
///
/// An explicitly given path must exist and parse. Without one, the default
/// location is used when present; a missing file yields built-in defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                warn!("No config file found, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

/// Resolve the root folder
///
/// **Priority:** CLI → `ANIDEX_ROOT_FOLDER` → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Per-user data directory (`<data_local_dir>/anidex`), or `./anidex_data`
/// when the platform reports none
pub fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_ROOT_FOLDER))
}

/// Resolve the species API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .ninja_api_key
        .as_ref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Species API key found in multiple sources: environment, TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Species API key loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("Species API key loaded from TOML config");
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "Species API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: ~/.config/anidex/anidex.toml (ninja_api_key = \"your-key\")\n\
         \n\
         Obtain API key at: https://api-ninjas.com",
        API_KEY_ENV
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Root folder layout and creation
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the root folder and its media directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Creating root folder: {}", self.path.display());
        }
        std::fs::create_dir_all(self.media_path())?;
        Ok(())
    }

    /// SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.path.join("anidex.db")
    }

    /// Uploaded media root (served under `/media/`)
    pub fn media_path(&self) -> PathBuf {
        self.path.join("media")
    }

    /// Default model directory
    pub fn model_dir(&self) -> PathBuf {
        self.path.join("model")
    }
}
