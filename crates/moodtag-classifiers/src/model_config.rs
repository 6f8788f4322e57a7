//! Model configuration and registry structures

use crate::labels::Emotion;
use moodtag_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Model registry containing all available models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRegistry {
    pub version: String,
    pub models: HashMap<String, ModelConfig>,
}

/// Configuration for a single model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name
    #[serde(default)]
    pub name: String,

    /// Model version
    #[serde(default)]
    pub version: String,

    /// Model description
    #[serde(default)]
    pub description: String,

    /// Model source (where to load from)
    pub source: ModelSource,

    /// Model architecture configuration
    #[serde(default)]
    pub architecture: ArchitectureConfig,

    /// Inference settings
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl ModelConfig {
    /// A fine-tuned DistilBERT emotion model in a local directory
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            description: String::new(),
            source: ModelSource::Local { path: path.into() },
            architecture: ArchitectureConfig::default(),
            inference: InferenceConfig::default(),
        }
    }

    /// The built-in keyword lexicon
    pub fn lexicon() -> Self {
        Self {
            source: ModelSource::Builtin {
                implementation: "lexicon".to_string(),
            },
            ..Self::local(PathBuf::new())
        }
    }
}

/// Model source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from local filesystem
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },

    /// Use built-in implementation
    Builtin { implementation: String },
}

fn default_revision() -> String {
    "main".to_string()
}

/// Model architecture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArchitectureConfig {
    /// BERT for sequence classification
    BertSequenceClassification {
        #[serde(default = "default_num_labels")]
        num_labels: usize,
        #[serde(default)]
        labels: Vec<String>,
    },

    /// DistilBERT for sequence classification
    DistilBertSequenceClassification {
        #[serde(default = "default_num_labels")]
        num_labels: usize,
        #[serde(default)]
        labels: Vec<String>,
    },
}

impl ArchitectureConfig {
    pub fn num_labels(&self) -> usize {
        match self {
            Self::BertSequenceClassification { num_labels, .. }
            | Self::DistilBertSequenceClassification { num_labels, .. } => *num_labels,
        }
    }

    pub fn labels(&self) -> &[String] {
        match self {
            Self::BertSequenceClassification { labels, .. }
            | Self::DistilBertSequenceClassification { labels, .. } => labels,
        }
    }
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self::DistilBertSequenceClassification {
            num_labels: default_num_labels(),
            labels: Vec::new(),
        }
    }
}

fn default_num_labels() -> usize {
    Emotion::ALL.len()
}

/// Inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Device to run on (cpu, cuda, metal)
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}

impl ModelRegistry {
    /// Load model registry from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read model registry {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse a model registry from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse model registry: {}", e)))
    }

    /// Get a model configuration by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_config() {
        let yaml = r#"
version: "1.0"
models:
  emotion:
    name: "emotion-distilbert"
    version: "1.0"
    description: "DistilBERT fine-tuned on the emotion dataset"
    source:
      type: local
      path: "./huggingface_model/fine_tuning/fine_tuned_emotion_model"
    architecture:
      type: distil-bert-sequence-classification
      num_labels: 6
      labels: [sadness, joy, love, anger, fear, surprise]
    inference:
      device: "cpu"
      max_length: 256
"#;

        let registry = ModelRegistry::from_yaml(yaml).unwrap();
        assert_eq!(registry.version, "1.0");
        assert_eq!(registry.models.len(), 1);

        let emotion = registry.get_model("emotion").unwrap();
        assert_eq!(emotion.name, "emotion-distilbert");
        assert_eq!(emotion.inference.max_length, 256);
        assert_eq!(emotion.architecture.num_labels(), 6);
        assert_eq!(emotion.architecture.labels()[1], "joy");
    }

    #[test]
    fn test_defaults() {
        let yaml = r#"
version: "1.0"
models:
  emotion:
    source:
      type: huggingface
      repo: "someone/distilbert-emotion"
"#;

        let registry = ModelRegistry::from_yaml(yaml).unwrap();
        let model = registry.get_model("emotion").unwrap();

        assert!(matches!(
            model.architecture,
            ArchitectureConfig::DistilBertSequenceClassification { num_labels: 6, .. }
        ));
        assert_eq!(model.inference.device, "cpu");
        assert_eq!(model.inference.max_length, 512);
        match &model.source {
            ModelSource::HuggingFace { repo, revision } => {
                assert_eq!(repo, "someone/distilbert-emotion");
                assert_eq!(revision, "main");
            }
            _ => panic!("Expected huggingface source"),
        }
    }

    #[test]
    fn test_builtin_source() {
        let yaml = r#"
version: "1.0"
models:
  fallback:
    source:
      type: builtin
      implementation: lexicon
"#;

        let registry = ModelRegistry::from_yaml(yaml).unwrap();
        match &registry.get_model("fallback").unwrap().source {
            ModelSource::Builtin { implementation } => assert_eq!(implementation, "lexicon"),
            _ => panic!("Expected builtin source"),
        }
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ModelRegistry::from_yaml("models: [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_registry_file() {
        let err = ModelRegistry::from_file("/nonexistent/models.yaml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
