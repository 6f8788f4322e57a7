//! moodtag bot actions
//!
//! Actions run after a user message has been annotated. They read the
//! conversation through a [`Tracker`], send replies through a
//! [`Dispatcher`] and return [`Event`]s such as slot updates.

pub mod action;
pub mod builtin;
pub mod config;
pub mod registry;

pub use action::{Action, BotMessage, Dispatcher, Event, Tracker};
pub use builtin::{
    SentimentResponseAction, TimeAction, WeatherAction, ACTION_GET_TIME, ACTION_GET_WEATHER,
    ACTION_RESPOND_TO_SENTIMENT,
};
pub use config::{ActionsConfig, SentimentResponseConfig};
pub use registry::{ActionRegistry, ActionResponse};
