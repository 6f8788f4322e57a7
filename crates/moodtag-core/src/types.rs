//! Core types for moodtag

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Message key holding the user text
pub const TEXT: &str = "text";

/// Message key holding the list of entity annotations
pub const ENTITIES: &str = "entities";

/// Default annotation kind written by the sentiment annotator
pub const SENTIMENT: &str = "sentiment";

/// A conversational message flowing through the host pipeline.
///
/// Besides the text, a message carries an open mapping of keys to JSON values
/// that upstream and downstream components read and write. The annotator only
/// ever touches the [`ENTITIES`] key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Free text of the message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Everything else the host attached to the message
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Message {
    /// Create a message holding the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            data: Map::new(),
        }
    }

    /// Create a message without text (e.g. an attachment-only message)
    pub fn without_text() -> Self {
        Self::default()
    }

    /// Raw text, as received
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text worth classifying: present and not only whitespace
    pub fn annotatable_text(&self) -> Option<&str> {
        self.text().filter(|t| !t.trim().is_empty())
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a value, replacing any previous value at the same key
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Raw entity records, whatever their shape
    pub fn entity_values(&self) -> &[Value] {
        match self.data.get(ENTITIES) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// Replace the entity list
    pub fn set_entities(&mut self, entities: Vec<Value>) {
        self.set(ENTITIES, Value::Array(entities));
    }

    /// Entity records that parse as annotations. Records of other shapes are skipped.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.entity_values()
            .iter()
            .filter_map(|v| match serde_json::from_value::<Annotation>(v.clone()) {
                Ok(annotation) => Some(annotation),
                Err(e) => {
                    tracing::trace!("Skipping non-annotation entity record: {}", e);
                    None
                }
            })
            .collect()
    }

    /// First annotation of the given kind
    pub fn annotation(&self, kind: &str) -> Option<Annotation> {
        self.annotations().into_iter().find(|a| a.kind == kind)
    }
}

/// A structured tag attached to a message
///
/// Deserialized records go through [`Annotation::new`], so a confidence read
/// back from a host message is clamped the same way as a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AnnotationRecord")]
pub struct Annotation {
    /// Annotation kind (serialized as `entity`)
    #[serde(rename = "entity")]
    pub kind: String,

    /// Predicted label
    pub value: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

impl Annotation {
    /// Create an annotation. Confidence is clamped into [0, 1]; NaN becomes 0.
    pub fn new(kind: impl Into<String>, value: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            kind: kind.into(),
            value: value.into(),
            confidence,
        }
    }

    /// Sentiment annotation with the default kind
    pub fn sentiment(value: impl Into<String>, confidence: f32) -> Self {
        Self::new(SENTIMENT, value, confidence)
    }

    /// JSON form stored in the message's entity list
    pub fn to_value(&self) -> Value {
        json!({
            "entity": self.kind,
            "value": self.value,
            "confidence": self.confidence,
        })
    }
}

/// Wire shape of an annotation, before validation
#[derive(Deserialize)]
struct AnnotationRecord {
    entity: String,
    value: String,
    confidence: f32,
}

impl From<AnnotationRecord> for Annotation {
    fn from(record: AnnotationRecord) -> Self {
        Self::new(record.entity, record.value, record.confidence)
    }
}

/// Handles a host runtime passes to components at construction.
///
/// Components accept these and ignore them: the model artifact location comes
/// from component configuration, not from host-managed storage.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    /// Host-managed model storage directory
    pub model_storage: Option<PathBuf>,

    /// Host resource identifier for this component
    pub resource: Option<String>,

    /// Name of the node the component runs as
    pub node_name: Option<String>,
}
