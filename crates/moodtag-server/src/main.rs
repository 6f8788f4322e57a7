//! moodtag
//!
//! Serves the emotion annotator and the chatbot actions over HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use moodtag_server::{create_router, AppState, ConfigOverrides, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "moodtag")]
#[command(about = "Emotion-tagging chatbot server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "MOODTAG_CONFIG")]
    config: PathBuf,

    /// Fine-tuned model directory, overrides the configured model
    #[arg(short, long, env = "MOODTAG_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Use the built-in keyword lexicon instead of a model
    #[arg(long)]
    lexicon: bool,

    /// Confidence threshold for emotion-specific replies
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Forecast reported by the weather action
    #[arg(long)]
    forecast: Option<String>,

    /// Listen address
    #[arg(short = 'l', long, default_value = "0.0.0.0")]
    listen: String,

    /// Listen port
    #[arg(short = 'P', long, default_value = "5005", env = "MOODTAG_PORT")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model_dir: self.model_dir.clone(),
            lexicon: self.lexicon,
            threshold: self.threshold,
            forecast: self.forecast.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting moodtag");

    let config = ServerConfig::load(&cli.config, &cli.overrides())?;
    info!("Configuration loaded");
    info!("Entity kind: {}", config.component.entity_kind);
    info!("Sentiment threshold: {}", config.actions.sentiment.threshold);

    let metrics_handle = init_metrics()?;

    // Model loading is blocking and may download from the hub
    let state = tokio::task::spawn_blocking(move || AppState::new(&config, metrics_handle)).await??;
    info!("Application state initialized successfully");

    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // Targets match by prefix, so "moodtag" covers every moodtag_* crate
    let filter = if verbose {
        EnvFilter::new("moodtag=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodtag=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "moodtag_requests_total",
        "Total number of HTTP requests by route"
    );
    metrics::describe_counter!(
        "moodtag_messages_total",
        "Messages processed by the annotator, by outcome"
    );
    metrics::describe_histogram!(
        "moodtag_classify_latency_us",
        metrics::Unit::Microseconds,
        "Classifier latency in microseconds"
    );
    metrics::describe_counter!("moodtag_actions_total", "Actions run by name");
    metrics::describe_counter!("moodtag_errors_total", "Total number of errors by type");

    info!("Metrics exporter initialized");
    Ok(handle)
}
