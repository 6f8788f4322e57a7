//! Built-in bot actions

use async_trait::async_trait;
use chrono::{Local, NaiveTime};
use moodtag_core::{Result, SENTIMENT};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::action::{Action, Dispatcher, Event, Tracker};
use crate::config::SentimentResponseConfig;

pub const ACTION_GET_TIME: &str = "action_get_time";
pub const ACTION_GET_WEATHER: &str = "action_get_weather";
pub const ACTION_RESPOND_TO_SENTIMENT: &str = "action_respond_to_sentiment";

pub const DEFAULT_FORECAST: &str = "sunny with a chance of rain";

type Clock = Arc<dyn Fn() -> NaiveTime + Send + Sync>;

/// Tells the user the current local time
pub struct TimeAction {
    clock: Clock,
}

impl TimeAction {
    pub fn new() -> Self {
        Self::with_clock(|| Local::now().time())
    }

    /// Use a fixed or fake clock instead of the system time
    pub fn with_clock(clock: impl Fn() -> NaiveTime + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }
}

impl Default for TimeAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for TimeAction {
    fn name(&self) -> &str {
        ACTION_GET_TIME
    }

    async fn run(&self, dispatcher: &mut Dispatcher, _tracker: &Tracker) -> Result<Vec<Event>> {
        let now = (self.clock)();
        dispatcher.utter_message(format!("The current time is {}", now.format("%H:%M:%S")));
        Ok(Vec::new())
    }
}

/// Reports a canned weather forecast
pub struct WeatherAction {
    forecast: String,
}

impl WeatherAction {
    pub fn new(forecast: impl Into<String>) -> Self {
        Self {
            forecast: forecast.into(),
        }
    }
}

impl Default for WeatherAction {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST)
    }
}

#[async_trait]
impl Action for WeatherAction {
    fn name(&self) -> &str {
        ACTION_GET_WEATHER
    }

    async fn run(&self, dispatcher: &mut Dispatcher, _tracker: &Tracker) -> Result<Vec<Event>> {
        dispatcher.utter_message(format!("The current weather is {}", self.forecast));
        Ok(Vec::new())
    }
}

/// Replies according to the detected emotion of the latest message
///
/// The reply for a label is only used when the annotation's confidence
/// reaches the threshold. Below it, or when the message carries no
/// sentiment annotation, the neutral acknowledgement is sent and no slot
/// is set.
pub struct SentimentResponseAction {
    threshold: f32,
    responses: HashMap<String, String>,
    neutral: String,
}

impl SentimentResponseAction {
    pub fn new(config: &SentimentResponseConfig) -> Self {
        Self {
            threshold: config.threshold,
            responses: config.responses.clone(),
            neutral: config.neutral.clone(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn response_for(&self, label: &str) -> &str {
        self.responses
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.neutral)
    }
}

impl Default for SentimentResponseAction {
    fn default() -> Self {
        Self::new(&SentimentResponseConfig::default())
    }
}

#[async_trait]
impl Action for SentimentResponseAction {
    fn name(&self) -> &str {
        ACTION_RESPOND_TO_SENTIMENT
    }

    async fn run(&self, dispatcher: &mut Dispatcher, tracker: &Tracker) -> Result<Vec<Event>> {
        match tracker.latest_sentiment() {
            Some(sentiment) if sentiment.confidence >= self.threshold => {
                debug!(
                    sender = %tracker.sender_id,
                    label = %sentiment.value,
                    confidence = sentiment.confidence,
                    "Responding to sentiment"
                );
                dispatcher.utter_message(self.response_for(&sentiment.value));
                Ok(vec![Event::slot(SENTIMENT, sentiment.value)])
            }
            other => {
                debug!(
                    sender = %tracker.sender_id,
                    confidence = other.map(|s| s.confidence),
                    threshold = self.threshold,
                    "No confident sentiment, sending neutral reply"
                );
                dispatcher.utter_message(self.neutral.as_str());
                Ok(Vec::new())
            }
        }
    }
}
