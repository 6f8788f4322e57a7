//! moodtag Core
//!
//! Core types and error handling shared across moodtag components.
//!
//! This crate provides:
//! - The conversational [`Message`] and the [`Annotation`] records written onto it
//! - Error types and result handling
//! - The [`HostContext`] handed to components by a host pipeline

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Annotation, HostContext, Message, ENTITIES, SENTIMENT, TEXT};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Annotation, HostContext, Message};
}
