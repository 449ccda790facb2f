//! Classifier adapter
//!
//! Wraps a pretrained image-classification model behind [`ImageClassifier`].
//! Classification never fails from the caller's point of view: any decode or
//! model error is reported as [`Classification::Unavailable`], whose label is
//! the sentinel [`UNKNOWN_ANIMAL`].

pub mod labels;
pub mod onnx;

use std::path::Path;
use thiserror::Error;

pub use labels::LabelTable;
pub use onnx::OnnxClassifier;

/// Sentinel label used when classification fails
pub const UNKNOWN_ANIMAL: &str = "Unknown Animal";

/// Outcome of a single classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Model produced a label
    Label(String),
    /// Image could not be classified
    Unavailable { reason: String },
}

impl Classification {
    /// Predicted label, or the sentinel when unavailable
    pub fn label(&self) -> &str {
        match self {
            Classification::Label(label) => label,
            Classification::Unavailable { .. } => UNKNOWN_ANIMAL,
        }
    }

    pub fn into_label(self) -> String {
        match self {
            Classification::Label(label) => label,
            Classification::Unavailable { .. } => UNKNOWN_ANIMAL.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Classification::Label(_))
    }
}

/// Classifier errors (internal; surfaced to callers as `Unavailable`)
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Image bytes could not be decoded
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Model loading or inference failed
    #[error("Model error: {0}")]
    Model(String),

    /// Label table missing or malformed
    #[error("Label table error: {0}")]
    Labels(String),

    /// Predicted class has no entry in the label table
    #[error("Class index {0} has no label")]
    UnknownClass(usize),

    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-image classifier shared across requests
///
/// Implementations are constructed once at startup and are read-only afterwards.
pub trait ImageClassifier: Send + Sync {
    /// Classify an in-memory image
    fn classify(&self, image_bytes: &[u8]) -> Classification;

    /// Classify an image stored on disk; same failure policy as [`classify`](Self::classify)
    fn classify_from_path(&self, path: &Path) -> Classification {
        match std::fs::read(path) {
            Ok(bytes) => self.classify(&bytes),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error in animal classification");
                Classification::Unavailable {
                    reason: ClassifierError::Io(e).to_string(),
                }
            }
        }
    }
}
