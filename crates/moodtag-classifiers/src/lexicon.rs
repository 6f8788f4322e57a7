//! Keyword lexicon emotion classifier
//!
//! Used when no fine-tuned model is available (demos, tests). It produces the
//! same six labels as the fine-tuned model, with smoothed keyword-frequency
//! scores, so downstream code does not need to care which backend is loaded.

use crate::classifier::{result_from_probabilities, ClassificationResult, Classifier};
use crate::labels::Emotion;
use aho_corasick::{AhoCorasick, MatchKind};
use moodtag_core::{Error, Result};
use std::time::Instant;

/// Additive smoothing per label
const SMOOTHING: f32 = 0.1;

const KEYWORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Sadness,
        &[
            "sad", "unhappy", "depressed", "lonely", "miserable", "heartbroken", "cry", "crying",
            "grief", "hopeless", "down", "gloomy",
        ],
    ),
    (
        Emotion::Joy,
        &[
            "happy", "glad", "great", "excited", "wonderful", "amazing", "fantastic", "awesome",
            "delighted", "cheerful", "good", "joy",
        ],
    ),
    (
        Emotion::Love,
        &[
            "love", "loving", "adore", "caring", "affection", "sweet", "tender", "cherish",
            "romantic", "beloved",
        ],
    ),
    (
        Emotion::Anger,
        &[
            "angry", "furious", "hate", "annoyed", "mad", "irritated", "rage", "outraged",
            "frustrated", "resentful",
        ],
    ),
    (
        Emotion::Fear,
        &[
            "afraid", "scared", "terrified", "anxious", "nervous", "worried", "fear", "panic",
            "frightened", "uneasy",
        ],
    ),
    (
        Emotion::Surprise,
        &[
            "surprised", "amazed", "astonished", "shocked", "unexpected", "wow", "stunned",
            "curious", "startled",
        ],
    ),
];

pub struct LexiconClassifier {
    name: String,
    matcher: AhoCorasick,
    pattern_emotions: Vec<Emotion>,
    labels: Vec<String>,
}

impl LexiconClassifier {
    pub fn new() -> Result<Self> {
        Self::with_name("emotion-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut pattern_emotions = Vec::new();
        for (emotion, words) in KEYWORDS {
            for word in *words {
                patterns.push(*word);
                pattern_emotions.push(*emotion);
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| {
                Error::model_unavailable(format!("Failed to build emotion lexicon matcher: {e}"))
            })?;

        Ok(Self {
            name: name.into(),
            matcher,
            pattern_emotions,
            labels: Emotion::default_labels(),
        })
    }

    /// Keyword hits per emotion, in class-index order
    fn hits(&self, text: &str) -> [f32; 6] {
        let mut hits = [0.0f32; 6];
        for m in self.matcher.find_iter(text) {
            if !is_whole_word(text, m.start(), m.end()) {
                continue;
            }
            let emotion = self.pattern_emotions[m.pattern().as_usize()];
            hits[emotion.index()] += 1.0;
        }
        hits
    }
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let hits = self.hits(text);
        let total: f32 = hits.iter().sum();
        let denom = total + SMOOTHING * hits.len() as f32;
        let probs: Vec<f32> = hits.iter().map(|h| (h + SMOOTHING) / denom).collect();

        result_from_probabilities(
            &self.name,
            &self.labels,
            &probs,
            start.elapsed().as_micros() as u64,
        )
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_joy() {
        let classifier = LexiconClassifier::new().unwrap();
        let result = classifier.classify("I am so happy today").unwrap();
        assert_eq!(result.label, "joy");
        assert!(result.score > 0.5, "score was {}", result.score);
    }

    #[test]
    fn test_majority_wins() {
        let classifier = LexiconClassifier::new().unwrap();
        let result = classifier
            .classify("I'm scared and worried, though a little happy")
            .unwrap();
        assert_eq!(result.label, "fear");
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = LexiconClassifier::new().unwrap();
        assert_eq!(classifier.classify("I HATE Mondays").unwrap().label, "anger");
    }

    #[test]
    fn test_partial_words_ignored() {
        let classifier = LexiconClassifier::new().unwrap();
        let result = classifier.classify("The crusade continued").unwrap();
        let scores = result.metadata.all_scores.unwrap();
        assert!(scores.iter().all(|(_, s)| (*s - 1.0 / 6.0).abs() < 1e-6));
    }

    #[test]
    fn test_empty_text_is_uniform() {
        let classifier = LexiconClassifier::new().unwrap();
        let result = classifier.classify("").unwrap();
        assert_eq!(result.label, "sadness");
        assert!((result.score - 1.0 / 6.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_label_in_set_and_score_in_range(text in "\\PC{0,200}") {
            let classifier = LexiconClassifier::new().unwrap();
            let result = classifier.classify(&text).unwrap();
            prop_assert!(classifier.labels().contains(&result.label));
            prop_assert!((0.0..=1.0).contains(&result.score));
        }

        #[test]
        fn prop_deterministic(text in "[a-z ]{0,80}") {
            let classifier = LexiconClassifier::new().unwrap();
            let a = classifier.classify(&text).unwrap();
            let b = classifier.classify(&text).unwrap();
            prop_assert_eq!(a.label, b.label);
            prop_assert_eq!(a.score, b.score);
        }
    }
}
