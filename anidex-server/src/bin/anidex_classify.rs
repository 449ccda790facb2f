//! anidex-classify - classify a photo from the command line
//!
//! Prints the predicted label; with `--enrich` also looks the animal up in
//! the species service and prints the normalized info as JSON.

use std::path::PathBuf;

use anidex_common::config::{load_toml_config, resolve_root_folder, RootFolder};
use anidex_common::AnimalInfo;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anidex_server::classifier::{ImageClassifier, OnnxClassifier};
use anidex_server::config::resolve_model_paths;
use anidex_server::pipeline::normalize_label;
use anidex_server::services::{LookupOutcome, SpeciesClient, SpeciesClientConfig, SpeciesLookup};

#[derive(Parser, Debug)]
#[command(name = "anidex-classify")]
#[command(about = "Classify an animal photo")]
#[command(version)]
struct Args {
    /// Image file to classify
    image: PathBuf,

    /// Also fetch species information for the predicted label
    #[arg(long)]
    enrich: bool,

    /// ONNX image classification model
    #[arg(long, env = "ANIDEX_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Class label table
    #[arg(long, env = "ANIDEX_LABELS_PATH")]
    labels: Option<PathBuf>,

    /// Species information endpoint
    #[arg(long, env = "ANIDEX_SPECIES_API_URL")]
    species_api_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let toml_config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration file")?;

    let root_folder = RootFolder::new(resolve_root_folder(None, &toml_config));
    let (model_path, labels_path) = resolve_model_paths(
        args.model.as_deref(),
        args.labels.as_deref(),
        &toml_config,
        &root_folder,
    );

    let classifier = OnnxClassifier::load(&model_path, &labels_path)
        .context("Failed to load classifier model")?;

    let classification = classifier.classify_from_path(&args.image);
    let label = classification.label().to_string();
    println!("{}", label);

    if !args.enrich {
        return Ok(());
    }

    let api_key = anidex_common::config::resolve_api_key(&toml_config)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let client = SpeciesClient::new(SpeciesClientConfig {
        api_url: args
            .species_api_url
            .clone()
            .or_else(|| toml_config.species_api_url.clone())
            .unwrap_or_else(|| anidex_common::config::DEFAULT_SPECIES_API_URL.to_string()),
        api_key,
    })?;

    match client.lookup(&label).await {
        LookupOutcome::Found(record) => {
            let info = AnimalInfo::from(&record);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        LookupOutcome::NotFound | LookupOutcome::Unavailable(_) => {
            println!("No additional info available for {}", normalize_label(&label));
        }
    }

    Ok(())
}
