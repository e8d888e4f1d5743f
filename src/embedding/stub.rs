use candle_core::{Device, Tensor};
use tracing::debug;

use crate::tokenizer::EncodedBatch;

use super::EmbeddingProvider;
use super::error::EmbeddingError;

/// Deterministic provider: every token id maps to a fixed pseudo-random vector.
///
/// Vectors depend only on the id (not on position or neighbours), so a text's
/// pooled embedding is identical whether it was encoded alone or padded in a batch.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    hidden_dim: usize,
}

impl StubEmbedder {
    pub fn new(hidden_dim: usize) -> Result<Self, EmbeddingError> {
        if hidden_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "stub hidden_dim must be greater than zero".to_string(),
            });
        }
        Ok(Self { hidden_dim })
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Writes the vector for `id` into `out` (values in `[-1, 1]`).
    fn token_vector(&self, id: u32, out: &mut Vec<f32>) {
        let digest = blake3::hash(&id.to_le_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed);

        for _ in 0..self.hidden_dim {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            out.push(value);
        }
    }
}

impl EmbeddingProvider for StubEmbedder {
    fn forward(&self, batch: &EncodedBatch) -> Result<Tensor, EmbeddingError> {
        debug!(
            batch = batch.batch_size(),
            seq = batch.seq_len(),
            "Generating stub token embeddings"
        );

        let mut data = Vec::with_capacity(batch.input_ids.len() * self.hidden_dim);
        for &id in &batch.input_ids {
            self.token_vector(id, &mut data);
        }

        Ok(Tensor::from_vec(
            data,
            (batch.batch_size(), batch.seq_len(), self.hidden_dim),
            &Device::Cpu,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(rows: &[Vec<u32>], seq: usize) -> EncodedBatch {
        EncodedBatch::from_rows(rows, seq, 1)
    }

    #[test]
    fn test_zero_dim_rejected() {
        assert!(StubEmbedder::new(0).is_err());
    }

    #[test]
    fn test_output_shape() {
        let stub = StubEmbedder::new(16).unwrap();
        let out = stub.forward(&batch(&[vec![0, 5, 2], vec![0, 2]], 3)).unwrap();
        assert_eq!(out.dims(), &[2, 3, 16]);
    }

    #[test]
    fn test_same_id_same_vector() {
        let stub = StubEmbedder::new(8).unwrap();
        let out = stub
            .forward(&batch(&[vec![7, 9, 7]], 3))
            .unwrap()
            .to_vec3::<f32>()
            .unwrap();
        assert_eq!(out[0][0], out[0][2]);
        assert_ne!(out[0][0], out[0][1]);
    }

    #[test]
    fn test_values_bounded_and_finite() {
        let stub = StubEmbedder::new(64).unwrap();
        let out = stub
            .forward(&batch(&[vec![0, 1, 2, 3, 4, 5]], 6))
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert!(out.iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_deterministic_across_instances() {
        let a = StubEmbedder::new(8).unwrap();
        let b = StubEmbedder::new(8).unwrap();
        let input = batch(&[vec![0, 42, 2]], 3);
        assert_eq!(
            a.forward(&input).unwrap().to_vec3::<f32>().unwrap(),
            b.forward(&input).unwrap().to_vec3::<f32>().unwrap()
        );
    }
}
