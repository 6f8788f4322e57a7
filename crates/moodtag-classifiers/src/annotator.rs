//! Message annotation
//!
//! The annotator runs one classification per message and records the result
//! as an entity annotation on the message. Batches are processed in order and
//! each message independently: one failure never stops the rest.

use crate::classifier::Classifier;
use moodtag_core::{Annotation, Error, Message, Result, SENTIMENT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the annotation is written into the message's entity list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityPolicy {
    /// Replace the whole entity list with the single annotation
    #[default]
    Overwrite,

    /// Keep entities of other kinds, replace prior annotations of our kind
    Merge,
}

/// Per-message result of a batch run
#[derive(Debug)]
pub enum AnnotationOutcome {
    /// The message was annotated
    Annotated(Annotation),

    /// The message had no text; left untouched
    Skipped,

    /// Classification failed; message left untouched
    Failed(Error),
}

impl AnnotationOutcome {
    pub fn is_annotated(&self) -> bool {
        matches!(self, Self::Annotated(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annotated(_) => "annotated",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<Result<Annotation>> for AnnotationOutcome {
    fn from(result: Result<Annotation>) -> Self {
        match result {
            Ok(annotation) => Self::Annotated(annotation),
            Err(Error::NoTextToAnnotate) => Self::Skipped,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Writes classifier output onto messages
#[derive(Clone)]
pub struct MessageAnnotator {
    classifier: Arc<dyn Classifier>,
    kind: String,
    policy: EntityPolicy,
}

impl MessageAnnotator {
    /// Create an annotator writing `sentiment` annotations with the overwrite policy
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            kind: SENTIMENT.to_string(),
            policy: EntityPolicy::default(),
        }
    }

    /// Set the annotation kind
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the entity policy
    pub fn with_policy(mut self, policy: EntityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn policy(&self) -> EntityPolicy {
        self.policy
    }

    /// Annotate one message in place.
    ///
    /// Returns [`Error::NoTextToAnnotate`] without touching the message when it
    /// has no text. On any error the message is left unchanged.
    pub fn annotate(&self, message: &mut Message) -> Result<Annotation> {
        let text = message.annotatable_text().ok_or(Error::NoTextToAnnotate)?;

        let result = self.classifier.classify(text)?;
        metrics::histogram!("moodtag_classify_latency_us").record(result.latency_us as f64);

        if !self.classifier.labels().iter().any(|l| *l == result.label) {
            return Err(Error::inference(format!(
                "Classifier '{}' returned label '{}' outside its label set",
                self.classifier.name(),
                result.label
            )));
        }

        let annotation = Annotation::new(&self.kind, result.label, result.score);
        self.write(message, &annotation);

        tracing::debug!(
            kind = %annotation.kind,
            value = %annotation.value,
            confidence = annotation.confidence,
            "Annotated message"
        );

        Ok(annotation)
    }

    fn write(&self, message: &mut Message, annotation: &Annotation) {
        let entities = match self.policy {
            EntityPolicy::Overwrite => vec![annotation.to_value()],
            EntityPolicy::Merge => {
                let mut kept: Vec<_> = message
                    .entity_values()
                    .iter()
                    .filter(|v| {
                        v.get("entity").and_then(|e| e.as_str()) != Some(self.kind.as_str())
                    })
                    .cloned()
                    .collect();
                kept.push(annotation.to_value());
                kept
            }
        };
        message.set_entities(entities);
    }

    /// Annotate a batch in order, reporting each message's outcome
    pub fn annotate_batch(&self, messages: &mut [Message]) -> Vec<AnnotationOutcome> {
        messages
            .iter_mut()
            .enumerate()
            .map(|(idx, message)| {
                let outcome = AnnotationOutcome::from(self.annotate(message));
                match &outcome {
                    AnnotationOutcome::Failed(e) => {
                        tracing::warn!(
                            index = idx,
                            "Annotation failed, passing message through: {}",
                            e
                        );
                    }
                    AnnotationOutcome::Skipped => {
                        tracing::debug!(index = idx, "Message has no text, skipping annotation");
                    }
                    AnnotationOutcome::Annotated(_) => {}
                }
                metrics::counter!("moodtag_messages_total", "outcome" => outcome.as_str())
                    .increment(1);
                outcome
            })
            .collect()
    }

    /// Annotate a batch and hand the messages back, same length and order
    pub fn process(&self, mut messages: Vec<Message>) -> Vec<Message> {
        self.annotate_batch(&mut messages);
        messages
    }
}
