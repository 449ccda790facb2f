//! anidex-server - Animal photo identification service
//!
//! Accepts photo uploads, classifies the animal with an ONNX vision model,
//! enriches the label with species facts from an external API, stores the
//! photo under `<root>/media/` and returns a JSON summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anidex_server::classifier::{ImageClassifier, OnnxClassifier};
use anidex_server::config::{Args, ServerConfig};
use anidex_server::pipeline::{RequestOrigin, UploadPipeline};
use anidex_server::services::{
    AnimalIdentifier, SpeciesClient, SpeciesClientConfig, SpeciesLookup,
};
use anidex_server::storage::MediaStore;
use anidex_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = anidex_common::config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration file")?;

    // RUST_LOG wins over the TOML level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting anidex-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServerConfig::resolve(&args, &toml_config);

    // Fail fast on a missing key rather than on the first upload
    let api_key = anidex_common::config::resolve_api_key(&toml_config)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    config
        .root_folder
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let db_path = config.root_folder.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = anidex_server::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    info!("Loading classifier model: {}", config.model_path.display());
    let classifier: Arc<dyn ImageClassifier> = Arc::new(
        OnnxClassifier::load(&config.model_path, &config.labels_path)
            .context("Failed to load classifier model")?,
    );

    let lookup: Arc<dyn SpeciesLookup> = Arc::new(SpeciesClient::new(SpeciesClientConfig {
        api_url: config.species_api_url.clone(),
        api_key,
    })?);
    info!("Species lookup: {}", config.species_api_url);

    let media_root = config.root_folder.media_path();
    let mut pipeline = UploadPipeline::new(
        AnimalIdentifier::new(classifier, lookup),
        MediaStore::new(media_root.clone()),
    );
    if config.record_uploads {
        info!("Upload recording enabled");
        pipeline = pipeline.with_records(db_pool.clone());
    }

    let bind_address = config.bind_address();
    let state = AppState::new(
        pipeline,
        db_pool,
        media_root,
        RequestOrigin::new("http", &bind_address),
    )
    .with_max_upload_bytes(config.max_upload_bytes);

    let state = match &config.public_url {
        Some(url) => {
            let origin = RequestOrigin::from_url(url)
                .ok_or_else(|| anyhow::anyhow!("Invalid public URL: {}", url))?;
            info!("Public origin: {}", origin.as_str());
            state.with_public_origin(origin)
        }
        None => state,
    };

    let app = anidex_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
