//! Error types for moodtag

/// Result type alias using moodtag's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for moodtag operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model artifact is missing or corrupt. Raised at construction only.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tokenization or the forward pass failed for one input
    #[error("inference error: {0}")]
    Inference(String),

    /// The message carries no text; the annotator treats this as a no-op
    #[error("message has no text to annotate")]
    NoTextToAnnotate,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Action execution errors
    #[error("action error: {0}")]
    Action(String),
}

impl Error {
    /// Create a new model-unavailable error
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new action error
    pub fn action(msg: impl Into<String>) -> Self {
        Self::Action(msg.into())
    }

    /// Whether the error only affects a single message and processing may continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Inference(_) | Self::NoTextToAnnotate)
    }
}
