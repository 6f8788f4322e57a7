//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use moodtag_actions::ActionRegistry;
use moodtag_classifiers::SentimentComponent;
use moodtag_core::HostContext;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Sentiment component holding the loaded model
    pub component: Arc<SentimentComponent>,

    /// Actions available to the webhooks
    pub actions: Arc<ActionRegistry>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Load the model and register actions. Fails if the model cannot be loaded.
    pub fn new(config: &ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Initializing application state");

        let component = SentimentComponent::create(&config.component, &HostContext::default())?;
        info!(
            "Sentiment component loaded (backend: {})",
            component.required_packages().join(", ")
        );

        let actions = ActionRegistry::with_defaults(&config.actions);
        info!("Actions available: {}", actions.names().join(", "));

        Ok(Self::from_parts(component, actions, metrics_handle))
    }

    pub fn from_parts(
        component: SentimentComponent,
        actions: ActionRegistry,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            component: Arc::new(component),
            actions: Arc::new(actions),
            metrics_handle,
        }
    }
}
