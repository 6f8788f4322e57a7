//! ML Classifier Integration Tests
//!
//! Tests against a real fine-tuned emotion model. These tests require the
//! `ml-models` feature flag and `MOODTAG_MODEL_DIR` pointing at the model
//! directory (config.json, model.safetensors, tokenizer files).

#![cfg(feature = "ml-models")]

use moodtag_classifiers::{Classifier, Emotion, EmotionModel, MessageAnnotator, ModelConfig};
use moodtag_core::{Message, SENTIMENT};
use std::sync::Arc;

fn load_model() -> Option<EmotionModel> {
    let dir = match std::env::var("MOODTAG_MODEL_DIR") {
        Ok(dir) => dir,
        Err(_) => {
            eprintln!("MOODTAG_MODEL_DIR not set, skipping");
            return None;
        }
    };

    match EmotionModel::load(&ModelConfig::local(dir)) {
        Ok(model) => Some(model),
        Err(e) => panic!("Failed to load emotion model: {}", e),
    }
}

#[test]
fn test_labels_are_the_six_emotions() {
    let Some(model) = load_model() else { return };
    assert_eq!(model.labels().len(), 6);
}

#[test]
fn test_joy() {
    let Some(model) = load_model() else { return };

    let result = model.classify("I am so happy today").unwrap();

    assert_eq!(result.label, Emotion::Joy.as_str());
    assert!(result.score > 0.5, "Expected confident joy, got {}", result.score);
}

#[test]
fn test_scores_are_probabilities() {
    let Some(model) = load_model() else { return };

    let test_cases = [
        "I feel so alone since she left",
        "This makes me furious",
        "I'm terrified of the exam tomorrow",
        "I adore my little sister",
        "Wow, I did not expect that at all",
        "",
    ];

    for text in test_cases {
        let result = model.classify(text).unwrap();
        assert!(model.labels().contains(&result.label));
        assert!((0.0..=1.0).contains(&result.score));

        let total: f32 = result
            .metadata
            .all_scores
            .unwrap()
            .iter()
            .map(|(_, s)| s)
            .sum();
        assert!((total - 1.0).abs() < 1e-3, "Scores summed to {}", total);
    }
}

#[test]
fn test_long_input_is_truncated() {
    let Some(model) = load_model() else { return };

    let text = "I am so happy today. ".repeat(400);
    let result = model.classify(&text).unwrap();

    assert!(result.metadata.token_count.unwrap() <= 512);
}

#[test]
fn test_annotator_with_model() {
    let Some(model) = load_model() else { return };
    let annotator = MessageAnnotator::new(Arc::new(model));

    let messages = annotator.process(vec![Message::new("I am so happy today")]);
    let annotation = messages[0].annotation(SENTIMENT).unwrap();

    assert_eq!(annotation.value, "joy");
    assert!(annotation.confidence > 0.5);
}
