//! Persisted animal record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One classified upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Auto-assigned identifier
    pub id: i64,
    /// Storage-relative image path (e.g. `animals/<uuid>.jpg`)
    pub image: String,
    /// Normalized predicted label
    pub predicted_label: Option<String>,
    /// Free-text notes
    pub info: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a record; `id` is assigned by the database
#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub image: String,
    pub predicted_label: Option<String>,
    pub info: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAnimal {
    /// New record stamped with the current time
    pub fn new(image: impl Into<String>, predicted_label: Option<String>) -> Self {
        Self {
            image: image.into(),
            predicted_label,
            info: None,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predicted_label.as_deref() {
            Some(label) if !label.is_empty() => f.write_str(label),
            _ => f.write_str("Unlabeled Animal"),
        }
    }
}

/// Listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimalFilter {
    /// Exact match on `predicted_label`
    #[serde(default)]
    pub predicted_label: Option<String>,
    /// Case-insensitive substring match over `predicted_label` and `info`
    #[serde(default)]
    pub search: Option<String>,
}
