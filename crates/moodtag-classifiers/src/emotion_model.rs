//! Fine-tuned transformer emotion classifier

use crate::classifier::{result_from_probabilities, ClassificationResult, Classifier};
use crate::labels::resolve_labels;
use crate::model_config::{ArchitectureConfig, ModelConfig};
use crate::model_loader::{
    configure_truncation, display_prefix, get_device, load_classification_head, load_tokenizer,
    load_var_builder, parse_json_config, read_model_config, resolve_model_path, scoped,
};
use candle_core::{Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use moodtag_core::{Error, Result};
use std::collections::HashMap;
use std::time::Instant;
use tokenizers::Tokenizer;

enum Backbone {
    DistilBert {
        model: DistilBertModel,
        pre_classifier: Option<Linear>,
    },
    Bert {
        model: BertModel,
        pooler: Option<Linear>,
    },
}

/// A sequence-classification model fine-tuned for emotion detection.
///
/// Loaded once; `classify` only reads the weights.
pub struct EmotionModel {
    name: String,
    tokenizer: Tokenizer,
    backbone: Backbone,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
}

impl EmotionModel {
    /// Load the model described by `config`
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let model_path = resolve_model_path(&config.source)?;
        let mut tokenizer = load_tokenizer(&model_path)?;
        let (config_path, config_str) = read_model_config(&model_path)?;
        let config_json: serde_json::Value = parse_json_config(&config_str, &config_path)?;

        // Position embeddings bound the usable sequence length
        let max_length = config_json
            .get("max_position_embeddings")
            .and_then(|v| v.as_u64())
            .map_or(config.inference.max_length, |max| {
                config.inference.max_length.min(max as usize)
            });
        configure_truncation(&mut tokenizer, max_length)?;

        let id2label: Option<HashMap<String, String>> = config_json
            .get("id2label")
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        let num_labels = config.architecture.num_labels();
        let labels = resolve_labels(num_labels, config.architecture.labels(), id2label.as_ref())?;

        let device = get_device(&config.inference.device)?;
        let vb = load_var_builder(&model_path, &device)?;

        let (backbone, hidden_size) = match &config.architecture {
            ArchitectureConfig::DistilBertSequenceClassification { .. } => {
                let hidden_size = config_json
                    .get("dim")
                    .or_else(|| config_json.get("hidden_size"))
                    .and_then(|v| v.as_u64())
                    .unwrap_or(768) as usize;

                let distilbert_config: DistilBertConfig =
                    parse_json_config(&config_str, &config_path)?;
                let model = DistilBertModel::load(vb.pp("distilbert"), &distilbert_config)
                    .map_err(|e| {
                        Error::model_unavailable(format!("Failed to load DistilBERT model: {}", e))
                    })?;

                let pre_classifier =
                    candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier")).ok();
                if pre_classifier.is_some() {
                    tracing::info!("Loaded pre_classifier layer (hidden_size={})", hidden_size);
                }

                (
                    Backbone::DistilBert {
                        model,
                        pre_classifier,
                    },
                    hidden_size,
                )
            }
            ArchitectureConfig::BertSequenceClassification { .. } => {
                let bert_config: BertConfig = parse_json_config(&config_str, &config_path)?;
                let (model, prefix) = load_bert_backbone(&vb, &bert_config, &["bert", ""])?;
                let pooler = candle_nn::linear(
                    bert_config.hidden_size,
                    bert_config.hidden_size,
                    scoped(&vb, prefix).pp("pooler").pp("dense"),
                )
                .ok();

                (Backbone::Bert { model, pooler }, bert_config.hidden_size)
            }
        };

        let classifier = load_classification_head(&vb, hidden_size, num_labels)?;
        let name = if config.name.is_empty() {
            "emotion-model".to_string()
        } else {
            config.name.clone()
        };

        tracing::info!(
            "Successfully loaded emotion classifier '{}' with {} labels: {:?}",
            name,
            num_labels,
            labels
        );

        Ok(Self {
            name,
            tokenizer,
            backbone,
            classifier,
            device,
            labels,
        })
    }

    fn logits(&self, ids: &[u32], type_ids: &[u32], attention: &[u32]) -> candle_core::Result<Tensor> {
        let pooled = match &self.backbone {
            Backbone::DistilBert {
                model,
                pre_classifier,
            } => {
                let input_ids: Vec<i64> = ids.iter().map(|&x| x as i64).collect();
                let input_ids = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;

                // DistilBERT masks positions where the mask is non-zero
                let inverted: Vec<u8> = attention
                    .iter()
                    .map(|&x| if x == 0 { 1u8 } else { 0u8 })
                    .collect();
                let mask = Tensor::new(inverted.as_slice(), &self.device)?.unsqueeze(0)?;

                let hidden_states = model.forward(&input_ids, &mask)?;
                let cls = hidden_states.i((0, 0, ..))?.unsqueeze(0)?;
                match pre_classifier {
                    Some(pre) => pre.forward(&cls)?.relu()?,
                    None => cls,
                }
            }
            Backbone::Bert { model, pooler } => {
                let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
                let token_type_ids = Tensor::new(type_ids, &self.device)?.unsqueeze(0)?;
                let mask = Tensor::new(attention, &self.device)?.unsqueeze(0)?;

                let hidden_states = model.forward(&input_ids, &token_type_ids, Some(&mask))?;
                let cls = hidden_states.i((0, 0, ..))?.unsqueeze(0)?;
                match pooler {
                    Some(dense) => dense.forward(&cls)?.tanh()?,
                    None => cls,
                }
            }
        };

        self.classifier.forward(&pooled)
    }
}

impl Classifier for EmotionModel {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::inference(format!("Tokenization failed: {}", e)))?;

        let logits = self
            .logits(
                encoding.get_ids(),
                encoding.get_type_ids(),
                encoding.get_attention_mask(),
            )
            .map_err(|e| Error::inference(format!("Model forward pass failed: {}", e)))?;

        let probs: Vec<f32> = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|p| p.squeeze(0))
            .and_then(|p| p.to_vec1())
            .map_err(|e| Error::inference(format!("Softmax failed: {}", e)))?;

        let mut result = result_from_probabilities(
            &self.name,
            &self.labels,
            &probs,
            start.elapsed().as_micros() as u64,
        )?;
        result.metadata.token_count = Some(encoding.get_ids().len());

        tracing::debug!(
            label = %result.label,
            score = result.score,
            latency_us = result.latency_us,
            "Classified text"
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn load_bert_backbone<'p>(
    vb: &VarBuilder,
    config: &BertConfig,
    prefixes: &[&'p str],
) -> Result<(BertModel, &'p str)> {
    let mut errors = Vec::new();

    for prefix in prefixes {
        match BertModel::load(scoped(vb, prefix), config) {
            Ok(model) => {
                tracing::info!("Loaded BERT backbone from '{}'", display_prefix(prefix));
                return Ok((model, *prefix));
            }
            Err(e) => errors.push(format!("{}: {}", display_prefix(prefix), e)),
        }
    }

    Err(Error::model_unavailable(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}
