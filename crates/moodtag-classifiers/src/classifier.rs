//! Classifier trait and common types

use moodtag_core::Result;

/// Trait for all emotion classifiers.
///
/// Implementations are immutable once constructed: `classify` takes `&self`
/// and must not mutate any state, so one instance can be shared across
/// annotators and threads.
pub trait Classifier: Send + Sync {
    /// Classify the given text
    fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// The fixed label set, in model output order
    fn labels(&self) -> &[String];
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Classification label
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// All class scores, in label order
    pub all_scores: Option<Vec<(String, f32)>>,

    /// Number of tokens fed to the model after truncation
    pub token_count: Option<usize>,
}

/// Pick the highest probability. Ties go to the earliest label.
pub fn select_label(labels: &[String], probs: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &p) in probs.iter().enumerate().take(labels.len()) {
        let p = if p.is_nan() { 0.0 } else { p };
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((idx, p)),
        }
    }
    best
}

/// Build a result from per-label probabilities
pub fn result_from_probabilities(
    model_name: &str,
    labels: &[String],
    probs: &[f32],
    latency_us: u64,
) -> Result<ClassificationResult> {
    let (idx, score) = select_label(labels, probs).ok_or_else(|| {
        moodtag_core::Error::inference(format!(
            "Model produced {} scores for {} labels",
            probs.len(),
            labels.len()
        ))
    })?;

    let all_scores = labels
        .iter()
        .zip(probs.iter())
        .map(|(label, p)| (label.clone(), *p))
        .collect();

    Ok(ClassificationResult {
        label: labels[idx].clone(),
        score: score.clamp(0.0, 1.0),
        metadata: ClassificationMetadata {
            model: Some(model_name.to_string()),
            all_scores: Some(all_scores),
            token_count: None,
        },
        latency_us,
    })
}
