//! The emotion label set and label resolution for loaded models

use moodtag_core::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Emotion categories of the fine-tuning dataset, in class-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Sadness,
    Joy,
    Love,
    Anger,
    Fear,
    Surprise,
}

impl Emotion {
    /// All emotions in class-index order
    pub const ALL: [Emotion; 6] = [
        Emotion::Sadness,
        Emotion::Joy,
        Emotion::Love,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sadness => "sadness",
            Self::Joy => "joy",
            Self::Love => "love",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
        }
    }

    /// Class index in the model head
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|e| e == self)
            .unwrap_or_default()
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Label names in class-index order
    pub fn default_labels() -> Vec<String> {
        Self::ALL.iter().map(|e| e.as_str().to_string()).collect()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| Error::config(format!("Unknown emotion label '{}'", s)))
    }
}

/// Resolve the label set of a model head.
///
/// The head must have exactly six classes, each naming one emotion.
/// Explicitly configured labels win, then a non-generic `id2label` from the
/// model's `config.json`, then the default emotion order. Label names are
/// normalised to their canonical lowercase form.
pub fn resolve_labels(
    num_labels: usize,
    configured: &[String],
    id2label: Option<&HashMap<String, String>>,
) -> Result<Vec<String>> {
    if num_labels != Emotion::ALL.len() {
        return Err(Error::model_unavailable(format!(
            "Expected a {}-class emotion head, model declares {} labels",
            Emotion::ALL.len(),
            num_labels
        )));
    }

    if !configured.is_empty() {
        return emotion_labels(configured);
    }

    match id2label.and_then(|map| labels_from_id2label(num_labels, map)) {
        Some(labels) => emotion_labels(&labels),
        None => Ok(Emotion::default_labels()),
    }
}

/// Map names onto the six emotions, each exactly once
fn emotion_labels(names: &[String]) -> Result<Vec<String>> {
    if names.len() != Emotion::ALL.len() {
        return Err(Error::model_unavailable(format!(
            "Configured {} labels for a {}-class emotion head",
            names.len(),
            Emotion::ALL.len()
        )));
    }

    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        let emotion: Emotion = name.parse().map_err(|_| {
            Error::model_unavailable(format!("Label '{}' is not an emotion", name))
        })?;
        if seen.contains(&emotion) {
            return Err(Error::model_unavailable(format!(
                "Emotion '{}' appears more than once in the label set",
                emotion
            )));
        }
        seen.push(emotion);
    }

    Ok(seen.iter().map(|e| e.as_str().to_string()).collect())
}

fn labels_from_id2label(num_labels: usize, map: &HashMap<String, String>) -> Option<Vec<String>> {
    let labels: Option<Vec<String>> = (0..num_labels)
        .map(|idx| map.get(&idx.to_string()).cloned())
        .collect();

    labels.filter(|labels| !labels.iter().any(|l| is_generic_label(l)))
}

/// `LABEL_3` style names carry no meaning
fn is_generic_label(label: &str) -> bool {
    label
        .strip_prefix("LABEL_")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
