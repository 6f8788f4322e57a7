//! Model loading for Candle-based emotion classifiers
//!
//! Everything here runs once, at component construction. Every failure is
//! reported as [`Error::ModelUnavailable`]: a component without its model
//! must not start.

use crate::classifier::Classifier;
use crate::emotion_model::EmotionModel;
use crate::lexicon::LexiconClassifier;
use crate::model_config::{ModelConfig, ModelSource};
use candle_core::{DType, Device};
use candle_nn::{Linear, VarBuilder};
use moodtag_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{PostProcessor, Tokenizer, TruncationParams};

/// Build the classifier described by `config`
pub fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn Classifier>> {
    match &config.source {
        ModelSource::Builtin { implementation } => match implementation.as_str() {
            "lexicon" => {
                tracing::info!("Using built-in lexicon emotion classifier");
                Ok(Arc::new(LexiconClassifier::new()?))
            }
            other => Err(Error::model_unavailable(format!(
                "Unknown builtin implementation '{}'",
                other
            ))),
        },
        _ => Ok(Arc::new(EmotionModel::load(config)?)),
    }
}

/// Resolve the directory holding the model artifact
pub fn resolve_model_path(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.is_dir() {
                return Err(Error::model_unavailable(format!(
                    "Model path does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => download_from_huggingface(repo, revision),
        ModelSource::Builtin { implementation } => Err(Error::model_unavailable(format!(
            "Builtin implementation '{}' has no model artifact",
            implementation
        ))),
    }
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!("Downloading model from HuggingFace: {} @ {}", repo, revision);

    let api = hf_hub::api::sync::Api::new().map_err(|e| {
        Error::model_unavailable(format!("Failed to initialize HuggingFace API: {}", e))
    })?;

    let repo_obj = api.repo(hf_hub::Repo::with_revision(
        repo.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    repo_obj.get("model.safetensors").map_err(|e| {
        Error::model_unavailable(format!("Failed to download model.safetensors: {}", e))
    })?;

    let mut found_tokenizer = false;
    for file in ["tokenizer.json", "vocab.txt"] {
        match repo_obj.get(file) {
            Ok(_) => {
                tracing::debug!("Found tokenizer file: {}", file);
                found_tokenizer = true;
            }
            Err(_) => tracing::debug!("File not found: {}", file),
        }
    }

    if !found_tokenizer {
        return Err(Error::model_unavailable(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let config_path = repo_obj.get("config.json").map_err(|e| {
        Error::model_unavailable(format!("Failed to download config.json: {}", e))
    })?;

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::model_unavailable("Invalid cache path"))?;

    tracing::info!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

/// Map a device name from configuration onto a Candle device
pub fn get_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "cpu" => Ok(Device::Cpu),
        "cuda" | "cuda:0" => Device::new_cuda(0)
            .map_err(|e| Error::model_unavailable(format!("Failed to initialize CUDA: {}", e))),
        "mps" | "metal" => Device::new_metal(0)
            .map_err(|e| Error::model_unavailable(format!("Failed to initialize Metal: {}", e))),
        other => Err(Error::model_unavailable(format!(
            "Unknown device '{}' (expected cpu, cuda or metal)",
            other
        ))),
    }
}

pub(crate) fn parse_json_config<T: DeserializeOwned>(config_str: &str, path: &Path) -> Result<T> {
    serde_json::from_str(config_str).map_err(|e| {
        Error::model_unavailable(format!("Failed to parse config {}: {}", path.display(), e))
    })
}

pub(crate) fn read_model_config(model_path: &Path) -> Result<(PathBuf, String)> {
    let config_path = model_path.join("config.json");
    let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::model_unavailable(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;
    Ok((config_path, config_str))
}

pub(crate) fn load_var_builder(model_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_path.join("model.safetensors");
    if !weights_path.exists() {
        return Err(Error::model_unavailable(format!(
            "model.safetensors not found in {}",
            model_path.display()
        )));
    }

    // SAFETY: the weights file is treated as read-only for the lifetime of the model.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(|e| Error::model_unavailable(format!("Failed to load weights: {}", e)))?
    };

    Ok(vb)
}

pub(crate) fn load_tokenizer(model_path: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_path.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path).map_err(|e| {
            Error::model_unavailable(format!("Failed to load tokenizer.json: {}", e))
        });
    }

    let vocab_path = model_path.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| {
                Error::model_unavailable(format!("Failed to build WordPiece model: {}", e))
            })?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

        let sep = special_token(&tokenizer, "[SEP]", &vocab_path)?;
        let cls = special_token(&tokenizer, "[CLS]", &vocab_path)?;
        tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));

        return Ok(tokenizer);
    }

    Err(Error::model_unavailable(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_path.display()
    )))
}

fn special_token(tokenizer: &Tokenizer, token: &str, vocab_path: &Path) -> Result<(String, u32)> {
    tokenizer
        .token_to_id(token)
        .map(|id| (token.to_string(), id))
        .ok_or_else(|| {
            Error::model_unavailable(format!(
                "Special token {} missing from {}",
                token,
                vocab_path.display()
            ))
        })
}

/// Truncate to `max_length` tokens including the special tokens the
/// post-processor adds, so `[CLS]` and `[SEP]` survive truncation
pub(crate) fn configure_truncation(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    let specials = tokenizer
        .get_post_processor()
        .map(|p| p.added_tokens(false))
        .unwrap_or(0);
    if max_length <= specials {
        return Err(Error::model_unavailable(format!(
            "max_length {} leaves no room for text after {} special tokens",
            max_length, specials
        )));
    }

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::model_unavailable(format!("Invalid truncation settings: {}", e)))?;
    Ok(())
}

/// Scope a var builder under `prefix`; the empty prefix is the root
pub(crate) fn scoped<'a>(vb: &VarBuilder<'a>, prefix: &str) -> VarBuilder<'a> {
    if prefix.is_empty() {
        vb.clone()
    } else {
        vb.pp(prefix)
    }
}

pub(crate) fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        "<root>"
    } else {
        prefix
    }
}

/// Load the fine-tuned classification head.
///
/// A fine-tuned artifact always carries its head, so a missing head means the
/// directory holds a base checkpoint, not an emotion model.
pub(crate) fn load_classification_head(
    vb: &VarBuilder,
    hidden_size: usize,
    num_labels: usize,
) -> Result<Linear> {
    let mut errors = Vec::new();

    for prefix in ["classifier", "score"] {
        match candle_nn::linear(hidden_size, num_labels, vb.pp(prefix)) {
            Ok(linear) => {
                tracing::info!(
                    "Loaded classification head from '{}' (hidden_size={}, num_labels={})",
                    prefix,
                    hidden_size,
                    num_labels
                );
                return Ok(linear);
            }
            Err(e) => errors.push(format!("{}: {}", prefix, e)),
        }
    }

    Err(Error::model_unavailable(format!(
        "No classification head with {} labels found [{}]; is this a fine-tuned model?",
        num_labels,
        errors.join(" | ")
    )))
}
