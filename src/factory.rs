//! Builds a ready [`SimilarityEngine`] from a [`Config`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::embedding::{BertEmbedder, EmbedderConfig, EmbeddingProvider, StubEmbedder};
use crate::ranking::{EngineError, SimilarityEngine};
use crate::tokenizer::{TokenizerConfig, VocabTokenizer};

/// Errors from [`build_engine`].
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Loads the vocabulary named by `config`.
///
/// `tokenizer.json` ids already carry the model's layout, so no offset is
/// applied to them; line vocabularies get the default offset.
pub fn build_tokenizer(config: &Config) -> Result<Arc<VocabTokenizer>, FactoryError> {
    let vocab_path = config.vocab_path.clone().ok_or(ConfigError::MissingEnvVar {
        name: "SKILLMATCH_VOCAB_PATH",
    })?;

    let mut tokenizer_config = TokenizerConfig::new(vocab_path).with_max_seq_len(config.max_seq_len);
    if tokenizer_config.is_tokenizer_json() {
        tokenizer_config = tokenizer_config.with_id_offset(0);
    }

    let tokenizer = VocabTokenizer::load(tokenizer_config).map_err(EngineError::from)?;
    Ok(Arc::new(tokenizer))
}

/// Picks the BERT encoder when a model directory is configured, the stub otherwise.
pub fn build_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>, FactoryError> {
    let provider: Arc<dyn EmbeddingProvider> = match &config.model_path {
        Some(path) => {
            let embedder_config = EmbedderConfig::new(path.clone()).with_device(config.device);
            Arc::new(BertEmbedder::load(&embedder_config).map_err(EngineError::from)?)
        }
        None => {
            warn!(
                stub_dim = config.stub_dim,
                "No SKILLMATCH_MODEL_PATH configured, running embedder in stub mode"
            );
            Arc::new(StubEmbedder::new(config.stub_dim).map_err(EngineError::from)?)
        }
    };
    Ok(provider)
}

/// Validates `config`, loads the tokenizer and provider and embeds the skill pool.
pub fn build_engine(config: &Config) -> Result<SimilarityEngine, FactoryError> {
    config.validate()?;

    let skills = config.load_skills()?;
    let tokenizer = build_tokenizer(config)?;
    let provider = build_provider(config)?;

    let engine =
        SimilarityEngine::new(skills, tokenizer, provider)?.with_default_top_k(config.top_k);

    info!(
        skills = engine.len(),
        hidden_dim = engine.hidden_dim(),
        top_k = config.top_k,
        "Engine built from configuration"
    );

    Ok(engine)
}
