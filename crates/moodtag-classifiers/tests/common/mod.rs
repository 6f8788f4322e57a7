//! Mock classifiers for testing
//!
//! Configurable implementations of the Classifier trait for exercising the
//! annotator, batch processing and error handling without model weights.

#![allow(dead_code)]

use moodtag_classifiers::classifier::ClassificationMetadata;
use moodtag_classifiers::{ClassificationResult, Classifier, Emotion};
use moodtag_core::Result;
use std::sync::atomic::{AtomicU32, Ordering};

/// A configurable mock classifier
pub struct MockClassifier {
    name: String,
    score: f32,
    label: String,
    labels: Vec<String>,
    call_count: AtomicU32,
}

impl MockClassifier {
    /// Create a new mock classifier with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0.9,
            label: "joy".to_string(),
            labels: Emotion::default_labels(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the score this classifier will return
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Set the label this classifier will return
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        // Text-driven labels make batch assertions readable
        let label = if text.contains("ANGRY") {
            "anger"
        } else if text.contains("SCARED") {
            "fear"
        } else {
            self.label.as_str()
        };

        Ok(ClassificationResult {
            label: label.to_string(),
            score: self.score,
            metadata: ClassificationMetadata::default(),
            latency_us: 100,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A classifier that fails on texts containing a marker - for testing error paths
pub struct FailingClassifier {
    name: String,
    marker: String,
    error_message: String,
    labels: Vec<String>,
    call_count: AtomicU32,
}

impl FailingClassifier {
    /// Fail on every input
    pub fn new(name: &str) -> Self {
        Self::failing_on(name, "")
    }

    /// Fail only on texts containing `marker`
    pub fn failing_on(name: &str, marker: &str) -> Self {
        Self {
            name: name.to_string(),
            marker: marker.to_string(),
            error_message: "Simulated inference failure".to_string(),
            labels: Emotion::default_labels(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for FailingClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if text.contains(&self.marker) {
            return Err(moodtag_core::Error::inference(&self.error_message));
        }

        Ok(ClassificationResult::new("joy", 0.8))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}
