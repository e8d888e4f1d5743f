use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use candle_core::{Device, Tensor};

use crate::tokenizer::{EncodedBatch, VocabTokenizer};

use super::EmbeddingProvider;
use super::error::EmbeddingError;

/// Value written at padding positions; pooling must never let it leak through.
const PAD_FILL: f32 = 1.0e3;

/// Test provider with caller-chosen vectors.
///
/// Every unmasked token of a row receives the vector registered for that row's
/// unpadded id sequence, so the row's mean-pooled embedding equals that vector.
#[derive(Debug)]
pub struct MockEmbedder {
    hidden_dim: usize,
    vectors: HashMap<Vec<u32>, Vec<f32>>,
    fallback: Option<Vec<f32>>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(hidden_dim: usize) -> Self {
        Self {
            hidden_dim,
            vectors: HashMap::new(),
            fallback: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new(1)
        }
    }

    /// Registers `vector` for an exact unpadded id sequence.
    pub fn with_ids(mut self, ids: Vec<u32>, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.hidden_dim, "vector width mismatch");
        self.vectors.insert(ids, vector);
        self
    }

    /// Registers `vector` for whatever `tokenizer` encodes `text` to.
    pub fn with_text(self, tokenizer: &VocabTokenizer, text: &str, vector: Vec<f32>) -> Self {
        let mut ids = tokenizer.encode_sequence(text);
        ids.truncate(tokenizer.max_seq_len());
        self.with_ids(ids, vector)
    }

    /// Vector used for rows with no registered sequence.
    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.hidden_dim, "vector width mismatch");
        self.fallback = Some(vector);
        self
    }

    /// Number of `forward` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    fn forward(&self, batch: &EncodedBatch) -> Result<Tensor, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(EmbeddingError::InferenceFailed {
                reason: reason.clone(),
            });
        }

        let mut data = Vec::with_capacity(batch.input_ids.len() * self.hidden_dim);
        for b in 0..batch.batch_size() {
            let key = batch.unpadded_ids(b);
            let vector = self
                .vectors
                .get(&key)
                .or(self.fallback.as_ref())
                .ok_or_else(|| EmbeddingError::InferenceFailed {
                    reason: format!("no mock vector for ids {:?}", key),
                })?;

            for &m in batch.mask(b) {
                if m != 0 {
                    data.extend_from_slice(vector);
                } else {
                    data.extend(std::iter::repeat_n(PAD_FILL, self.hidden_dim));
                }
            }
        }

        Ok(Tensor::from_vec(
            data,
            (batch.batch_size(), batch.seq_len(), self.hidden_dim),
            &Device::Cpu,
        )?)
    }
}
