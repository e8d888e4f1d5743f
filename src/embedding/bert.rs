use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{self, BertModel};
use candle_transformers::models::xlm_roberta::{self, XLMRobertaModel};
use tracing::{debug, info};

use crate::tokenizer::EncodedBatch;

use super::EmbeddingProvider;
use super::config::EmbedderConfig;
use super::device::select_device;
use super::error::EmbeddingError;

const BERT_WEIGHTS_KEY: &str = "bert.embeddings.word_embeddings.weight";
const ROBERTA_WEIGHTS_KEY: &str = "roberta.embeddings.word_embeddings.weight";

/// Encoder family, which decides how position ids are built.
///
/// BERT numbers positions from zero. XLM-RoBERTa numbers non-pad tokens from
/// `pad_token_id + 1` and gives pad tokens the pad position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderArchitecture {
    Bert,
    XlmRoberta,
}

impl EncoderArchitecture {
    /// Picks the family from `config.json`'s `model_type`, falling back to the
    /// weight prefix when the type is missing or unrecognized.
    pub fn detect(model_type: Option<&str>, has_roberta_weights: bool) -> Self {
        let model_type = model_type.map(|t| t.trim().to_ascii_lowercase().replace('_', "-"));
        match model_type.as_deref() {
            Some("xlm-roberta" | "roberta") => Self::XlmRoberta,
            Some("bert") if !has_roberta_weights => Self::Bert,
            _ if has_roberta_weights => Self::XlmRoberta,
            _ => Self::Bert,
        }
    }
}

/// Returns the tensor-name prefix of the checkpoint, if any.
fn weight_prefix(contains: impl Fn(&str) -> bool) -> Option<&'static str> {
    if contains(BERT_WEIGHTS_KEY) {
        Some("bert")
    } else if contains(ROBERTA_WEIGHTS_KEY) {
        Some("roberta")
    } else {
        None
    }
}

enum Encoder {
    Bert(BertModel),
    XlmRoberta(XLMRobertaModel),
}

/// BERT-family encoder (safetensors weights) exposing its last hidden state.
///
/// Plain BERT checkpoints run through [`BertModel`]; XLM-RoBERTa and RoBERTa
/// checkpoints run through [`XLMRobertaModel`] so their position ids match
/// the pretrained layout.
#[derive(Clone)]
pub struct BertEmbedder {
    model: Arc<Encoder>,
    architecture: EncoderArchitecture,
    device: Device,
    hidden_size: usize,
}

impl std::fmt::Debug for BertEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEmbedder")
            .field("architecture", &self.architecture)
            .field("device", &format!("{:?}", self.device))
            .field("hidden_size", &self.hidden_size)
            .finish()
    }
}

impl BertEmbedder {
    /// Loads `config.json` + `model.safetensors` from `config.model_dir`.
    pub fn load(config: &EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let device = select_device(config.device)?;
        debug!(?device, "Selected compute device for encoder");

        let config_content = std::fs::read_to_string(config.config_path())?;
        let raw_config: serde_json::Value =
            serde_json::from_str(&config_content).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {}", e),
            })?;

        // SAFETY: the weights file is only read, and outlives the mapping via VarBuilder.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[config.weights_path()], DType::F32, &device)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to map safetensors: {}", e),
        })?;

        let prefix = weight_prefix(|key| vb.contains_tensor(key));
        let architecture = EncoderArchitecture::detect(
            raw_config.get("model_type").and_then(|v| v.as_str()),
            prefix == Some("roberta"),
        );
        let vb = match prefix {
            Some(prefix) => vb.pp(prefix),
            None => vb,
        };

        let (model, hidden_size) = match architecture {
            EncoderArchitecture::Bert => {
                let model_config: bert::Config = parse_config(raw_config)?;
                let model = BertModel::load(vb, &model_config).map_err(load_failed)?;
                (Encoder::Bert(model), model_config.hidden_size)
            }
            EncoderArchitecture::XlmRoberta => {
                let model_config: xlm_roberta::Config = parse_config(raw_config)?;
                let model = XLMRobertaModel::new(&model_config, vb).map_err(load_failed)?;
                (Encoder::XlmRoberta(model), model_config.hidden_size)
            }
        };

        info!(
            model_dir = %config.model_dir.display(),
            ?architecture,
            weight_prefix = prefix.unwrap_or(""),
            hidden_size,
            "Encoder loaded successfully"
        );

        Ok(Self {
            model: Arc::new(model),
            architecture,
            device,
            hidden_size,
        })
    }

    pub fn architecture(&self) -> EncoderArchitecture {
        self.architecture
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(
    raw: serde_json::Value,
) -> Result<T, EmbeddingError> {
    serde_json::from_value(raw).map_err(|e| EmbeddingError::ModelLoadFailed {
        reason: format!("Failed to parse config.json: {}", e),
    })
}

fn load_failed(e: candle_core::Error) -> EmbeddingError {
    EmbeddingError::ModelLoadFailed {
        reason: format!("Failed to load encoder weights: {}", e),
    }
}

impl EmbeddingProvider for BertEmbedder {
    fn forward(&self, batch: &EncodedBatch) -> Result<Tensor, EmbeddingError> {
        let (input_ids, attention_mask) = batch.to_tensors(&self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        debug!(
            batch = batch.batch_size(),
            seq = batch.seq_len(),
            architecture = ?self.architecture,
            "Running encoder forward pass"
        );

        let hidden = match self.model.as_ref() {
            Encoder::Bert(model) => {
                model.forward(&input_ids, &token_type_ids, Some(&attention_mask))
            }
            Encoder::XlmRoberta(model) => {
                let attention_mask = attention_mask.to_dtype(DType::F32)?;
                model.forward(
                    &input_ids,
                    &attention_mask,
                    &token_type_ids,
                    None,
                    None,
                    None,
                )
            }
        };

        hidden.map_err(|e| EmbeddingError::InferenceFailed {
            reason: format!("Encoder forward pass failed: {}", e),
        })
    }
}
