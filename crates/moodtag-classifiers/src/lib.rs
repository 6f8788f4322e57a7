//! moodtag Classifiers
//!
//! Emotion classification for chat messages and the annotator that writes the
//! result back onto each message.
//!
//! - [`EmotionModel`]: a fine-tuned DistilBERT/BERT sequence classifier run with Candle
//! - [`LexiconClassifier`]: keyword fallback over the same six labels
//! - [`MessageAnnotator`]: one classification per message, recorded as an entity
//! - [`SentimentComponent`]: the annotator packaged for a host pipeline
//!
//! Classification is synchronous. A loaded classifier is immutable and can be
//! shared across threads behind an `Arc`.

pub mod annotator;
pub mod classifier;
pub mod component;
pub mod emotion_model;
pub mod labels;
pub mod lexicon;
pub mod model_config;
pub mod model_loader;

pub use annotator::{AnnotationOutcome, EntityPolicy, MessageAnnotator};
pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use component::{ComponentConfig, MessageComponent, SentimentComponent};
pub use emotion_model::EmotionModel;
pub use labels::Emotion;
pub use lexicon::LexiconClassifier;
pub use model_config::{
    ArchitectureConfig, InferenceConfig, ModelConfig, ModelRegistry, ModelSource,
};
pub use model_loader::load_classifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::annotator::{AnnotationOutcome, EntityPolicy, MessageAnnotator};
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::component::{ComponentConfig, MessageComponent, SentimentComponent};
    pub use crate::labels::Emotion;
    pub use crate::model_config::ModelConfig;
}
