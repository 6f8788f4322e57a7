//! moodtag server
//!
//! HTTP surface for the emotion annotator: a parse endpoint, the REST chat
//! channel used by the web frontend, and an action webhook.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{ConfigOverrides, ServerConfig};
pub use routes::{create_router, AppError, RestReply};
pub use state::AppState;
