//! Class index → human-readable label table
//!
//! Two formats are accepted:
//! - a model `config.json` with an `id2label` object (`{"0": "tench, Tinca tinca", ...}`)
//! - a plain text file with one label per line, line N naming class N

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::ClassifierError;

#[derive(Debug, Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

/// Label table loaded alongside the model
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: BTreeMap<usize, String>,
}

impl LabelTable {
    /// Load from a `.json` model config or a plain text label list
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let table = if is_json {
            Self::from_config_json(&content)?
        } else {
            Self::from_lines(&content)
        };

        if table.is_empty() {
            return Err(ClassifierError::Labels(format!(
                "No labels found in {}",
                path.display()
            )));
        }

        tracing::debug!(path = %path.display(), classes = table.len(), "Label table loaded");
        Ok(table)
    }

    /// Parse the `id2label` map of a model config
    pub fn from_config_json(content: &str) -> Result<Self, ClassifierError> {
        let config: ModelConfig = serde_json::from_str(content)
            .map_err(|e| ClassifierError::Labels(format!("Invalid model config: {}", e)))?;

        let mut labels = BTreeMap::new();
        for (id, label) in config.id2label {
            let index: usize = id
                .parse()
                .map_err(|_| ClassifierError::Labels(format!("Non-numeric class id: {}", id)))?;
            labels.insert(index, label);
        }

        Ok(Self { labels })
    }

    /// One label per line; trailing whitespace is dropped
    pub fn from_lines(content: &str) -> Self {
        let labels = content
            .lines()
            .map(|line| line.trim_end().to_string())
            .enumerate()
            .collect();

        Self { labels }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_json() {
        let json = r#"{
            "architectures": ["ViTForImageClassification"],
            "id2label": {"0": "tench, Tinca tinca", "1": "goldfish, Carassius auratus", "292": "tiger, Panthera tigris"}
        }"#;
        let table = LabelTable::from_config_json(json).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some("tench, Tinca tinca"));
        assert_eq!(table.get(292), Some("tiger, Panthera tigris"));
        assert_eq!(table.get(5), None);
    }

    #[test]
    fn test_config_json_bad_id() {
        let json = r#"{"id2label": {"zero": "tench"}}"#;
        assert!(matches!(
            LabelTable::from_config_json(json),
            Err(ClassifierError::Labels(_))
        ));
    }

    #[test]
    fn test_config_json_without_id2label() {
        assert!(LabelTable::from_config_json(r#"{"model_type": "vit"}"#).is_err());
    }

    #[test]
    fn test_lines() {
        let table = LabelTable::from_lines("tench\ngoldfish  \r\ngreat white shark\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some("goldfish"));
        assert_eq!(table.get(2), Some("great white shark"));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("labels.txt");
        std::fs::write(&txt, "cat\ndog\n").unwrap();
        assert_eq!(LabelTable::load(&txt).unwrap().get(1), Some("dog"));

        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"id2label": {"0": "cat"}}"#).unwrap();
        assert_eq!(LabelTable::load(&json).unwrap().get(0), Some("cat"));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "").unwrap();
        assert!(LabelTable::load(&empty).is_err());
    }
}
