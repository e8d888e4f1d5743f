//! Embedding providers.
//!
//! An [`EmbeddingProvider`] turns an [`EncodedBatch`] into per-token vectors
//! (`[batch, seq, hidden]`). The hidden size is whatever the provider returns;
//! nothing downstream assumes a fixed dimension.
//!
//! - [`BertEmbedder`] runs a BERT-family encoder with candle.
//! - [`StubEmbedder`] is deterministic and model-free (tests, demos).

/// BERT / XLM-RoBERTa encoder returning the last hidden state.
pub mod bert;
/// Embedder configuration.
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
/// Deterministic model-free provider.
pub mod stub;

pub use bert::{BertEmbedder, EncoderArchitecture};
pub use config::EmbedderConfig;
pub use device::{DevicePreference, select_device};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use stub::StubEmbedder;

use candle_core::Tensor;

use crate::tokenizer::EncodedBatch;

/// Maps a token-id batch to per-token vectors.
///
/// Implementations are called synchronously and may be shared across threads;
/// a provider whose backend is not reentrant must serialize access internally.
pub trait EmbeddingProvider: Send + Sync {
    /// Returns a `[batch, seq, hidden]` tensor for `batch`.
    fn forward(&self, batch: &EncodedBatch) -> Result<Tensor, EmbeddingError>;
}
