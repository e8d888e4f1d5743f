//! Skillmatch library crate (used by the CLI binary and integration tests).
//!
//! Ranks a fixed pool of skill labels against free text by cosine similarity
//! of mean-pooled encoder embeddings.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`VocabTokenizer`], [`Vocabulary`], [`EncodedBatch`] - Text to token ids
//! - [`EmbeddingProvider`] - Token ids to per-token vectors
//! - [`SimilarityEngine`], [`RankedResult`] - Skill pool ranking
//!
//! ## Providers
//! - [`BertEmbedder`] - candle BERT encoder (last hidden state)
//! - [`StubEmbedder`] - Deterministic, model-free vectors
//!
//! ## Wiring
//! - [`Config`], [`ConfigError`] - `SKILLMATCH_*` environment configuration
//! - [`build_engine`] - Config to ready engine
//!
//! ## Test/Mock Support
//! [`MockEmbedder`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod factory;
pub mod pooling;
pub mod ranking;
pub mod tokenizer;

pub use config::{Config, ConfigError};
pub use embedding::{
    BertEmbedder, DevicePreference, EmbedderConfig, EmbeddingError, EmbeddingProvider,
    EncoderArchitecture, StubEmbedder, select_device,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use factory::{FactoryError, build_engine, build_provider, build_tokenizer};
pub use pooling::{mean_pool, pool_batch};
pub use ranking::{
    EngineError, RankedResult, RankedSkill, SimilarityEngine, cosine_similarity, top_k_indices,
};
pub use tokenizer::{
    EncodedBatch, SpecialTokenIds, SpecialTokens, TokenizerConfig, TokenizerError,
    VocabTokenizer, Vocabulary,
};
