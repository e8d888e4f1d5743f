//! Masked mean pooling of per-token vectors.
//!
//! `pooled[b] = Σ_{s: mask[b,s]=1} tokens[b,s] / max(Σ_s mask[b,s], ε)`.
//! A row with no unmasked tokens pools to the zero vector.

use candle_core::{DType, Tensor};

use crate::constants::EPSILON;
use crate::embedding::EmbeddingError;
use crate::tokenizer::EncodedBatch;

/// Pools `[batch, seq, hidden]` token vectors into `[batch, hidden]` (F32).
///
/// Masked positions are selected out rather than multiplied by zero, so
/// non-finite values at padding positions cannot leak into the result.
pub fn mean_pool(token_embeddings: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let token_embeddings = token_embeddings.to_dtype(DType::F32)?;

    let keep = attention_mask
        .to_dtype(DType::U8)?
        .unsqueeze(2)?
        .broadcast_as(token_embeddings.shape())?;
    let masked = keep.where_cond(&token_embeddings, &token_embeddings.zeros_like()?)?;
    let summed = masked.sum(1)?;

    let counts = attention_mask
        .to_dtype(DType::F32)?
        .sum_keepdim(1)?
        .maximum(EPSILON as f64)?;

    summed.broadcast_div(&counts)
}

/// Pools a provider's output for `batch` into one vector per row.
///
/// Fails with [`EmbeddingError::ShapeMismatch`] unless the output is
/// `[batch, seq, hidden]` with `hidden > 0`.
pub fn pool_batch(
    token_embeddings: &Tensor,
    batch: &EncodedBatch,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let dims = token_embeddings.dims();
    let matches = dims.len() == 3
        && dims[0] == batch.batch_size()
        && dims[1] == batch.seq_len()
        && dims[2] > 0;
    if !matches {
        return Err(EmbeddingError::ShapeMismatch {
            expected: batch.shape.to_vec(),
            actual: dims.to_vec(),
        });
    }

    let attention_mask = Tensor::from_slice(
        &batch.attention_mask,
        (batch.batch_size(), batch.seq_len()),
        token_embeddings.device(),
    )?;

    Ok(mean_pool(token_embeddings, &attention_mask)?.to_vec2::<f32>()?)
}
