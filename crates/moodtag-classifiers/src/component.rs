//! Host pipeline component wrapping the annotator

use crate::annotator::{AnnotationOutcome, EntityPolicy, MessageAnnotator};
use crate::classifier::Classifier;
use crate::model_config::{ModelConfig, ModelRegistry, ModelSource};
use crate::model_loader::load_classifier;
use moodtag_core::{Error, HostContext, Message, Result, SENTIMENT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Registry entry used when a registry file is given without a model name
pub const DEFAULT_MODEL_NAME: &str = "emotion";

/// A message-processing stage in a host pipeline
pub trait MessageComponent: Send + Sync {
    fn name(&self) -> &str;

    /// Process messages at inference time; same length and order out as in
    fn process(&self, messages: Vec<Message>) -> Vec<Message>;

    /// Process training examples. Non-trainable components pass them through.
    fn process_training_data(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
    }
}

/// Configuration for the sentiment component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Inline model configuration
    #[serde(default)]
    pub model: Option<ModelConfig>,

    /// Model registry file, used when no inline model is given
    #[serde(default)]
    pub registry: Option<PathBuf>,

    /// Entry to pick from the registry
    #[serde(default)]
    pub model_name: Option<String>,

    /// Annotation kind written onto messages
    #[serde(default = "default_entity_kind")]
    pub entity_kind: String,

    /// How the annotation is combined with existing entities
    #[serde(default)]
    pub entity_policy: EntityPolicy,
}

fn default_entity_kind() -> String {
    SENTIMENT.to_string()
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            model: Some(ModelConfig::local("./models/fine_tuned_emotion_model")),
            registry: None,
            model_name: None,
            entity_kind: default_entity_kind(),
            entity_policy: EntityPolicy::default(),
        }
    }
}

impl ComponentConfig {
    /// Component backed by the built-in lexicon
    pub fn lexicon() -> Self {
        Self {
            model: Some(ModelConfig::lexicon()),
            ..Self::default()
        }
    }

    /// The model configuration this component loads
    pub fn resolve_model(&self) -> Result<ModelConfig> {
        if let Some(model) = &self.model {
            return Ok(model.clone());
        }

        let path = self
            .registry
            .as_ref()
            .ok_or_else(|| Error::config("No model or model registry configured"))?;
        let registry = ModelRegistry::from_file(path)?;
        let name = self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME);

        registry.get_model(name).cloned().ok_or_else(|| {
            Error::config(format!(
                "Model '{}' not found in registry {}",
                name,
                path.display()
            ))
        })
    }
}

/// Tags each message with the emotion detected in its text.
///
/// The model is loaded once in [`SentimentComponent::create`] and owned by
/// the component for its whole lifetime.
pub struct SentimentComponent {
    annotator: MessageAnnotator,
    backend: &'static str,
}

impl SentimentComponent {
    /// Build the component. Host handles in `_host` are accepted and ignored.
    ///
    /// Fails with [`Error::ModelUnavailable`] if the model cannot be loaded.
    pub fn create(config: &ComponentConfig, _host: &HostContext) -> Result<Self> {
        let model = config.resolve_model()?;
        let backend = match &model.source {
            ModelSource::Builtin { .. } => "aho-corasick",
            _ => "candle",
        };

        let classifier = load_classifier(&model)?;
        tracing::info!(
            "Sentiment component ready (classifier '{}', labels {:?})",
            classifier.name(),
            classifier.labels()
        );

        let mut component = Self::from_classifier(classifier, config);
        component.backend = backend;
        Ok(component)
    }

    /// Build around an already loaded classifier
    pub fn from_classifier(classifier: Arc<dyn Classifier>, config: &ComponentConfig) -> Self {
        let annotator = MessageAnnotator::new(classifier)
            .with_kind(config.entity_kind.clone())
            .with_policy(config.entity_policy);

        Self {
            annotator,
            backend: "custom",
        }
    }

    pub fn annotator(&self) -> &MessageAnnotator {
        &self.annotator
    }

    /// Process a batch and report per-message outcomes
    pub fn process_with_outcomes(&self, messages: &mut [Message]) -> Vec<AnnotationOutcome> {
        self.annotator.annotate_batch(messages)
    }

    /// Inference backend this component depends on
    pub fn required_packages(&self) -> Vec<&'static str> {
        vec![self.backend]
    }
}

impl MessageComponent for SentimentComponent {
    fn name(&self) -> &str {
        "sentiment"
    }

    fn process(&self, messages: Vec<Message>) -> Vec<Message> {
        self.annotator.process(messages)
    }
}
