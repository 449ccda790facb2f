//! Species metadata model
//!
//! Two shapes live here:
//! - [`SpeciesRecord`]: the external species service payload, deserialized
//!   into a typed but partially-populated structure. Every level is optional.
//! - [`AnimalInfo`]: the normalized form returned to API clients.
//!
//! Absence of a whole record is modelled by the caller (`Option<SpeciesRecord>`),
//! distinct from absence of individual fields inside a record.

use serde::{Deserialize, Deserializer, Serialize};

/// One species entry as returned by the external species service
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpeciesRecord {
    /// Common name
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Taxonomic classification
    #[serde(default)]
    pub taxonomy: Option<Taxonomy>,
    /// Regions where the species lives
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub locations: Option<Vec<String>>,
    /// Free-form characteristics (habitat, diet, ...)
    #[serde(default)]
    pub characteristics: Option<SpeciesCharacteristics>,
}

impl SpeciesRecord {
    /// True when the service returned an entry with none of the known fields
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.taxonomy.is_none()
            && self.locations.is_none()
            && self.characteristics.is_none()
    }
}

/// Taxonomy block of a [`SpeciesRecord`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Taxonomy {
    #[serde(default, deserialize_with = "lenient_string")]
    pub kingdom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phylum: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub order: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub family: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub genus: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub scientific_name: Option<String>,
}

/// Characteristics block of a [`SpeciesRecord`]
///
/// The service returns many more keys; only the ones surfaced to clients are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpeciesCharacteristics {
    #[serde(default, deserialize_with = "lenient_string")]
    pub habitat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub diet: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lifespan: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub top_speed: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slogan: Option<String>,
}

/// Normalized animal information returned to clients
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AnimalInfo {
    pub name: Option<String>,
    pub characteristics: Characteristics,
    pub locations: Vec<String>,
}

/// Normalized characteristics; every field independently nullable
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Characteristics {
    pub scientific_name: Option<String>,
    pub habitat: Option<String>,
    pub diet: Option<String>,
    pub lifespan: Option<String>,
    pub weight: Option<String>,
    pub top_speed: Option<String>,
    pub slogan: Option<String>,
}

impl From<&SpeciesRecord> for AnimalInfo {
    fn from(record: &SpeciesRecord) -> Self {
        let traits = record.characteristics.as_ref();

        Self {
            name: record.name.clone(),
            characteristics: Characteristics {
                scientific_name: record
                    .taxonomy
                    .as_ref()
                    .and_then(|t| t.scientific_name.clone()),
                habitat: traits.and_then(|c| c.habitat.clone()),
                diet: traits.and_then(|c| c.diet.clone()),
                lifespan: traits.and_then(|c| c.lifespan.clone()),
                weight: traits.and_then(|c| c.weight.clone()),
                top_speed: traits.and_then(|c| c.top_speed.clone()),
                slogan: traits.and_then(|c| c.slogan.clone()),
            },
            locations: record.locations.clone().unwrap_or_default(),
        }
    }
}

/// Accept strings, numbers and booleans as text; anything else becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string))
}

/// Accept an array of scalars; non-array values become `None`, non-scalar items are skipped
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => {
            Some(items.into_iter().filter_map(scalar_to_string).collect())
        }
        _ => None,
    })
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
