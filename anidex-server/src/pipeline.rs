//! Upload orchestration pipeline
//!
//! One request, one pass, terminal at the first outcome:
//! 1. validate that an image was supplied
//! 2. classify and enrich
//! 3. normalize the label (first comma-separated synonym)
//! 4. gate on species metadata (absence → not found)
//! 5. store the image, optionally record it
//! 6. shape the response
//!
//! Failures in steps 2–6 surface as [`UploadError::Internal`]; nothing else escapes.

use anidex_common::AnimalInfo;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::db;
use crate::models::NewAnimal;
use crate::services::AnimalIdentifier;
use crate::storage::{self, MediaStore};

/// Upload outcomes other than success
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    /// No `image` field in the request (400)
    #[error("No image provided")]
    MissingInput,

    /// Species service had nothing for the predicted animal (404)
    #[error("No additional info available for {0}")]
    MetadataNotFound(String),

    /// Anything unexpected (500)
    #[error("Failed to upload image: {0}")]
    Internal(String),
}

/// The `image` field of an upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied filename; only its extension is kept
    pub file_name: Option<String>,
    pub bytes: Arc<[u8]>,
}

/// Scheme and authority the request was served on, e.g. `http://localhost:8000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
    pub fn new(scheme: &str, authority: &str) -> Self {
        Self(format!("{}://{}", scheme, authority))
    }

    /// Parse a configured public URL such as `https://anidex.example.org/`
    ///
    /// Only scheme, host and port are kept; `None` when the URL has no host.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        let authority = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Some(Self::new(parsed.scheme(), &authority))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join an origin-relative path (`/media/...`)
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.0.trim_end_matches('/'), path)
    }
}

/// Successful upload payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
    pub image_url: String,
    pub predicted_animal: String,
    pub animal_info: AnimalInfo,
}

/// Keep only the first synonym of a comma-separated model label
///
/// `"Malayan_tiger, Panthera tigris"` → `"Malayan_tiger"`; labels without a
/// comma are returned unchanged.
pub fn normalize_label(label: &str) -> String {
    match label.split_once(',') {
        Some((first, _)) => first.trim().to_string(),
        None => label.to_string(),
    }
}

/// Per-request upload orchestration over shared, read-only components
#[derive(Clone)]
pub struct UploadPipeline {
    identifier: AnimalIdentifier,
    media: MediaStore,
    records: Option<SqlitePool>,
}

impl UploadPipeline {
    pub fn new(identifier: AnimalIdentifier, media: MediaStore) -> Self {
        Self {
            identifier,
            media,
            records: None,
        }
    }

    /// Also insert an `animals` record for every successful upload
    pub fn with_records(mut self, pool: SqlitePool) -> Self {
        self.records = Some(pool);
        self
    }

    pub fn records_enabled(&self) -> bool {
        self.records.is_some()
    }

    /// Run the pipeline for one request
    pub async fn process(
        &self,
        upload: Option<ImageUpload>,
        origin: &RequestOrigin,
    ) -> Result<UploadResponse, UploadError> {
        let upload = upload.ok_or(UploadError::MissingInput)?;

        let identification = self
            .identifier
            .classify_and_enrich(Arc::clone(&upload.bytes))
            .await
            .map_err(|e| UploadError::Internal(e.to_string()))?;

        let predicted_animal = normalize_label(&identification.predicted_label);
        info!(predicted_animal = %predicted_animal, "Classification result");

        let record = match identification.animal_info {
            Some(record) => record,
            None => {
                let subject = if predicted_animal.is_empty() {
                    "this animal".to_string()
                } else {
                    predicted_animal
                };
                return Err(UploadError::MetadataNotFound(subject));
            }
        };

        let filename = storage::unique_filename(upload.file_name.as_deref());
        let stored_path = self
            .media
            .save(&storage::animal_image_path(&filename), &upload.bytes)
            .await
            .map_err(|e| UploadError::Internal(e.to_string()))?;

        if let Some(pool) = &self.records {
            let animal = NewAnimal::new(stored_path.clone(), Some(predicted_animal.clone()));
            let inserted = db::animals::insert_animal(pool, &animal)
                .await
                .map_err(|e| UploadError::Internal(e.to_string()))?;
            debug!(id = inserted.id, "Upload recorded");
        }

        let image_url = origin.absolute_url(&storage::media_url_path(&stored_path));
        info!(image_url = %image_url, "Image stored");

        Ok(UploadResponse {
            image_url,
            predicted_animal,
            animal_info: AnimalInfo::from(&record),
        })
    }
}
