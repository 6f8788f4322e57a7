//! Action registry and execution

use moodtag_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::action::{Action, BotMessage, Dispatcher, Event, Tracker};
use crate::builtin::{SentimentResponseAction, TimeAction, WeatherAction};
use crate::config::ActionsConfig;

/// Result of running an action: events for the tracker and bot replies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub events: Vec<Event>,
    pub responses: Vec<BotMessage>,
}

/// Registry of actions by name
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in time, weather and sentiment actions
    pub fn with_defaults(config: &ActionsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TimeAction::new()));
        registry.register(Arc::new(WeatherAction::new(config.weather_forecast.clone())));
        registry.register(Arc::new(SentimentResponseAction::new(&config.sentiment)));

        info!("Registered {} actions", registry.count());
        registry
    }

    /// Register an action, replacing any previous one with the same name
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered action names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn count(&self) -> usize {
        self.actions.len()
    }

    /// Run the named action against the tracker
    pub async fn run(&self, name: &str, tracker: &Tracker) -> Result<ActionResponse> {
        let action = self
            .get(name)
            .ok_or_else(|| Error::action(format!("Action '{}' not found", name)))?;

        let mut dispatcher = Dispatcher::new();
        let events = action.run(&mut dispatcher, tracker).await?;

        debug!(
            action = name,
            sender = %tracker.sender_id,
            events = events.len(),
            responses = dispatcher.messages().len(),
            "Action completed"
        );

        Ok(ActionResponse {
            events,
            responses: dispatcher.into_messages(),
        })
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
