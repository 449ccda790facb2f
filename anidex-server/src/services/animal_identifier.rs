//! Animal identification: classification plus species enrichment
//!
//! Combines the shared [`ImageClassifier`] and [`SpeciesLookup`] into the
//! composite `classify_and_enrich` operation used by the upload pipeline.

use anidex_common::SpeciesRecord;
use std::path::Path;
use std::sync::Arc;

use crate::classifier::{Classification, ImageClassifier};
use crate::services::species_client::{LookupOutcome, SpeciesLookup};

/// Classification result enriched with species metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// Raw model label (may list synonyms separated by commas)
    pub predicted_label: String,
    /// First matching species record, if any
    pub animal_info: Option<SpeciesRecord>,
}

/// Shared identifier component, constructed once at startup
#[derive(Clone)]
pub struct AnimalIdentifier {
    classifier: Arc<dyn ImageClassifier>,
    lookup: Arc<dyn SpeciesLookup>,
}

impl AnimalIdentifier {
    pub fn new(classifier: Arc<dyn ImageClassifier>, lookup: Arc<dyn SpeciesLookup>) -> Self {
        Self { classifier, lookup }
    }

    /// Classify in-memory image bytes (blocking; CPU-bound)
    pub fn classify(&self, image_bytes: &[u8]) -> Classification {
        self.classifier.classify(image_bytes)
    }

    /// Classify an image on disk (blocking; CPU-bound)
    pub fn classify_from_path(&self, path: &Path) -> Classification {
        self.classifier.classify_from_path(path)
    }

    /// Look up species metadata by name
    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        self.lookup.lookup(name).await
    }

    /// Classify, then look up the raw label
    ///
    /// Inference runs on the blocking thread pool. The join error (a panic
    /// inside the model) is the only failure this returns.
    pub async fn classify_and_enrich(
        &self,
        image_bytes: Arc<[u8]>,
    ) -> Result<Identification, tokio::task::JoinError> {
        let classifier = Arc::clone(&self.classifier);
        let classification =
            tokio::task::spawn_blocking(move || classifier.classify(&image_bytes)).await?;

        let predicted_label = classification.into_label();
        let animal_info = self.lookup(&predicted_label).await.into_record();

        tracing::debug!(
            label = %predicted_label,
            has_info = animal_info.is_some(),
            "Identification complete"
        );

        Ok(Identification {
            predicted_label,
            animal_info,
        })
    }
}
