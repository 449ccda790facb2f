//! Configuration resolution for anidex-server
//!
//! Provides multi-tier configuration resolution with CLI → ENV → TOML →
//! default priority. CLI and environment are both handled by clap `env`
//! attributes; the TOML layer comes from `anidex_common::config`.

use anidex_common::config::{
    resolve_root_folder, RootFolder, TomlConfig, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_PORT, DEFAULT_SPECIES_API_URL,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// Model file name inside the default model directory
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";

/// Label table file name inside the default model directory
pub const DEFAULT_LABELS_FILE: &str = "config.json";

/// Command-line arguments for anidex-server
#[derive(Parser, Debug, Default)]
#[command(name = "anidex-server")]
#[command(about = "Animal photo classification and species lookup service")]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root folder holding the database and uploaded media
    #[arg(short, long, env = "ANIDEX_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ANIDEX_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ANIDEX_PORT")]
    pub port: Option<u16>,

    /// ONNX image classification model
    #[arg(long, env = "ANIDEX_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Class label table (`config.json` with `id2label`, or one label per line)
    #[arg(long, env = "ANIDEX_LABELS_PATH")]
    pub labels: Option<PathBuf>,

    /// Species information endpoint
    #[arg(long, env = "ANIDEX_SPECIES_API_URL")]
    pub species_api_url: Option<String>,

    /// Public origin for returned URLs (e.g. `https://anidex.example.org`);
    /// without it the request's `Host` header is used
    #[arg(long, env = "ANIDEX_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Insert a database record for every successful upload
    #[arg(long, env = "ANIDEX_RECORD_UPLOADS")]
    pub record_uploads: bool,
}

/// Fully resolved server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: RootFolder,
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub species_api_url: String,
    pub public_url: Option<String>,
    pub record_uploads: bool,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Merge CLI/env arguments over the TOML file and built-in defaults
    pub fn resolve(args: &Args, toml_config: &TomlConfig) -> Self {
        let root_folder = RootFolder::new(resolve_root_folder(
            args.root_folder.as_deref(),
            toml_config,
        ));
        let (model_path, labels_path) = resolve_model_paths(
            args.model.as_deref(),
            args.labels.as_deref(),
            toml_config,
            &root_folder,
        );

        let config = Self {
            host: args
                .host
                .clone()
                .or_else(|| toml_config.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            species_api_url: args
                .species_api_url
                .clone()
                .or_else(|| toml_config.species_api_url.clone())
                .unwrap_or_else(|| DEFAULT_SPECIES_API_URL.to_string()),
            public_url: args
                .public_url
                .clone()
                .or_else(|| toml_config.public_url.clone()),
            record_uploads: args.record_uploads || toml_config.record_uploads.unwrap_or(false),
            max_upload_bytes: toml_config
                .max_upload_bytes
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            root_folder,
            model_path,
            labels_path,
        };

        info!(
            root_folder = %config.root_folder.path().display(),
            model = %config.model_path.display(),
            record_uploads = config.record_uploads,
            "Configuration resolved"
        );
        config
    }

    /// `host:port` listen address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve model and label table paths
///
/// **Priority:** CLI/ENV → TOML → `<root>/model/`
pub fn resolve_model_paths(
    model: Option<&Path>,
    labels: Option<&Path>,
    toml_config: &TomlConfig,
    root_folder: &RootFolder,
) -> (PathBuf, PathBuf) {
    let model_path = model
        .map(Path::to_path_buf)
        .or_else(|| toml_config.model_path.clone())
        .unwrap_or_else(|| root_folder.model_dir().join(DEFAULT_MODEL_FILE));
    let labels_path = labels
        .map(Path::to_path_buf)
        .or_else(|| toml_config.labels_path.clone())
        .unwrap_or_else(|| root_folder.model_dir().join(DEFAULT_LABELS_FILE));

    (model_path, labels_path)
}
