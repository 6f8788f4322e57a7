//! Action trait and conversation state handed to actions

use async_trait::async_trait;
use moodtag_core::{Annotation, Message, Result, SENTIMENT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named bot action run in response to a user message
#[async_trait]
pub trait Action: Send + Sync {
    /// Name the dialogue policy refers to this action by
    fn name(&self) -> &str;

    /// Run the action, uttering responses through the dispatcher
    async fn run(&self, dispatcher: &mut Dispatcher, tracker: &Tracker) -> Result<Vec<Event>>;
}

/// Conversation events returned by actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Set a slot on the conversation
    Slot { name: String, value: Value },
}

impl Event {
    pub fn slot(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Slot {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A message the bot sends back to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotMessage {
    pub text: String,
}

/// Collects bot utterances in the order they are made
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    messages: Vec<BotMessage>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response
    pub fn utter_message(&mut self, text: impl Into<String>) {
        self.messages.push(BotMessage { text: text.into() });
    }

    pub fn messages(&self) -> &[BotMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<BotMessage> {
        self.messages
    }
}

/// Conversation state visible to an action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tracker {
    pub sender_id: String,

    /// The most recent user message, already annotated
    #[serde(default)]
    pub latest_message: Message,

    #[serde(default)]
    pub slots: Map<String, Value>,
}

impl Tracker {
    pub fn new(sender_id: impl Into<String>, latest_message: Message) -> Self {
        Self {
            sender_id: sender_id.into(),
            latest_message,
            slots: Map::new(),
        }
    }

    /// Sentiment annotation on the latest message, if any
    pub fn latest_sentiment(&self) -> Option<Annotation> {
        self.latest_annotation(SENTIMENT)
    }

    pub fn latest_annotation(&self, kind: &str) -> Option<Annotation> {
        self.latest_message.annotation(kind)
    }

    pub fn get_slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatcher_keeps_order() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.utter_message("first");
        dispatcher.utter_message("second");

        let texts: Vec<_> = dispatcher.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::slot("sentiment", "joy");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "slot", "name": "sentiment", "value": "joy"})
        );
    }

    #[test]
    fn test_tracker_latest_sentiment() {
        let mut message = Message::new("I'm scared");
        message.set_entities(vec![Annotation::sentiment("fear", 0.8).to_value()]);
        let tracker = Tracker::new("user-1", message);

        let sentiment = tracker.latest_sentiment().unwrap();
        assert_eq!(sentiment.value, "fear");
        assert!(tracker.get_slot("sentiment").is_none());
    }

    #[test]
    fn test_tracker_deserializes_with_defaults() {
        let tracker: Tracker = serde_json::from_value(json!({"sender_id": "abc"})).unwrap();
        assert_eq!(tracker.sender_id, "abc");
        assert!(tracker.latest_sentiment().is_none());
    }
}
