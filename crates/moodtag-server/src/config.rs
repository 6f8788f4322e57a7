//! Server configuration

use moodtag_actions::ActionsConfig;
use moodtag_classifiers::{ComponentConfig, ModelConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration, loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Sentiment component (model source, entity kind and policy)
    #[serde(default)]
    pub component: ComponentConfig,

    /// Built-in action settings
    #[serde(default)]
    pub actions: ActionsConfig,
}

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Local fine-tuned model directory
    pub model_dir: Option<PathBuf>,

    /// Use the built-in lexicon instead of a model
    pub lexicon: bool,

    /// Confidence threshold for sentiment replies
    pub threshold: Option<f32>,

    /// Forecast reported by the weather action
    pub forecast: Option<String>,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    ///
    /// A missing file falls back to defaults.
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            tracing::warn!(
                "Config file {} not found, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply(overrides)?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply CLI overrides on top of the file values
    pub fn apply(&mut self, overrides: &ConfigOverrides) -> anyhow::Result<()> {
        if overrides.lexicon && overrides.model_dir.is_some() {
            anyhow::bail!("--lexicon and --model-dir cannot be used together");
        }

        if let Some(dir) = &overrides.model_dir {
            let mut model = ModelConfig::local(dir.clone());
            if let Some(current) = &self.component.model {
                model.architecture = current.architecture.clone();
                model.inference = current.inference.clone();
            }
            self.component.model = Some(model);
        }

        if overrides.lexicon {
            self.component.model = Some(ModelConfig::lexicon());
        }

        if let Some(threshold) = overrides.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("Threshold must be between 0 and 1, got {}", threshold);
            }
            self.actions.sentiment.threshold = threshold;
        }

        if let Some(forecast) = &overrides.forecast {
            self.actions.weather_forecast = forecast.clone();
        }

        Ok(())
    }
}
