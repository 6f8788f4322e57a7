//! Action configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::builtin::DEFAULT_FORECAST;

/// Configuration for the built-in actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Forecast reported by `action_get_weather`
    #[serde(default = "default_forecast")]
    pub weather_forecast: String,

    #[serde(default)]
    pub sentiment: SentimentResponseConfig,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            weather_forecast: default_forecast(),
            sentiment: SentimentResponseConfig::default(),
        }
    }
}

/// Configuration for `action_respond_to_sentiment`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResponseConfig {
    /// Minimum confidence for an emotion-specific reply
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Reply per emotion label
    #[serde(default = "default_responses")]
    pub responses: HashMap<String, String>,

    /// Reply used below the threshold or for unknown labels
    #[serde(default = "default_neutral")]
    pub neutral: String,
}

impl Default for SentimentResponseConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            responses: default_responses(),
            neutral: default_neutral(),
        }
    }
}

fn default_forecast() -> String {
    DEFAULT_FORECAST.to_string()
}

fn default_threshold() -> f32 {
    0.5
}

fn default_neutral() -> String {
    "Thanks for telling me. How can I help?".to_string()
}

fn default_responses() -> HashMap<String, String> {
    [
        ("sadness", "I'm sorry you're feeling down. I'm here if you want to talk about it."),
        ("joy", "That's great to hear!"),
        ("love", "That's lovely. It sounds like it means a lot to you."),
        ("anger", "I can tell you're frustrated. Let's see if we can sort it out together."),
        ("fear", "That sounds worrying. Let's take it one step at a time."),
        ("surprise", "Oh, that's unexpected!"),
    ]
    .into_iter()
    .map(|(label, text)| (label.to_string(), text.to_string()))
    .collect()
}
