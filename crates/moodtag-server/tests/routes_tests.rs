//! Route tests against the router with the lexicon backend

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use moodtag_actions::{ActionRegistry, ActionsConfig};
use moodtag_classifiers::{
    ClassificationResult, Classifier, ComponentConfig, Emotion, SentimentComponent,
};
use moodtag_server::{create_router, AppState, ConfigOverrides, RestReply, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let mut config = ServerConfig::default();
    config
        .apply(&ConfigOverrides {
            lexicon: true,
            ..Default::default()
        })
        .unwrap();

    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::new(&config, handle).unwrap())
}

/// Backend whose every forward pass fails
struct BrokenModel {
    labels: Vec<String>,
}

impl Classifier for BrokenModel {
    fn classify(&self, _text: &str) -> moodtag_core::Result<ClassificationResult> {
        Err(moodtag_core::Error::inference("forward pass failed"))
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn broken_app() -> Router {
    let classifier = Arc::new(BrokenModel {
        labels: Emotion::default_labels(),
    });
    let component = SentimentComponent::from_classifier(classifier, &ComponentConfig::lexicon());
    let actions = ActionRegistry::with_defaults(&ActionsConfig::default());

    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::from_parts(component, actions, handle))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_parse_annotates_message() {
    let (status, body) = post_json(app(), "/model/parse", json!({"text": "I am so happy today"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "I am so happy today");
    assert_eq!(body["entities"][0]["entity"], "sentiment");
    assert_eq!(body["entities"][0]["value"], "joy");
    let confidence = body["entities"][0]["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_parse_empty_text_passes_through() {
    let (status, body) = post_json(app(), "/model/parse", json!({"text": "   "})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("entities").is_none());
}

#[tokio::test]
async fn test_parse_reports_inference_failure() {
    let (status, body) =
        post_json(broken_app(), "/model/parse", json!({"text": "I am so happy today"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "inference_error");
    assert!(body.get("entities").is_none());
}

#[tokio::test]
async fn test_parse_empty_text_skips_broken_model() {
    let (status, body) = post_json(broken_app(), "/model/parse", json!({"text": ""})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("entities").is_none());
}

#[tokio::test]
async fn test_rest_webhook_does_not_reply_on_inference_failure() {
    let (status, body) = post_json(
        broken_app(),
        "/webhooks/rest/webhook",
        json!({"sender": "web-user", "message": "I am so happy and glad today"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "inference_error");
    assert!(serde_json::from_value::<Vec<RestReply>>(body).is_err());
}

#[tokio::test]
async fn test_rest_webhook_replies_to_emotion() {
    let (status, body) = post_json(
        app(),
        "/webhooks/rest/webhook",
        json!({"sender": "web-user", "message": "I am so happy and glad today"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let replies: Vec<RestReply> = serde_json::from_value(body).unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].recipient_id, "web-user");
    assert_eq!(replies[0].text, "That's great to hear!");
}

#[tokio::test]
async fn test_rest_webhook_neutral_without_emotion() {
    let (status, body) = post_json(
        app(),
        "/webhooks/rest/webhook",
        json!({"sender": "web-user", "message": "What is the time?"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let replies: Vec<RestReply> = serde_json::from_value(body).unwrap();
    assert_eq!(replies[0].text, "Thanks for telling me. How can I help?");
}

#[tokio::test]
async fn test_action_webhook_runs_weather() {
    let (status, body) = post_json(
        app(),
        "/webhook",
        json!({"next_action": "action_get_weather", "sender_id": "abc"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"], json!([]));
    assert_eq!(
        body["responses"][0]["text"],
        "The current weather is sunny with a chance of rain"
    );
}

#[tokio::test]
async fn test_action_webhook_sets_sentiment_slot() {
    let (status, body) = post_json(
        app(),
        "/webhook",
        json!({
            "next_action": "action_respond_to_sentiment",
            "sender_id": "abc",
            "tracker": {
                "sender_id": "abc",
                "latest_message": {
                    "text": "I'm terrified",
                    "entities": [{"entity": "sentiment", "value": "fear", "confidence": 0.7}]
                }
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["events"],
        json!([{"event": "slot", "name": "sentiment", "value": "fear"}])
    );
}

#[tokio::test]
async fn test_unknown_action_is_not_found() {
    let (status, body) = post_json(
        app(),
        "/webhook",
        json!({"next_action": "action_launch_rocket", "sender_id": "abc"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "action_not_found");
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
