use candle_core::{Device, Tensor};

/// A rectangular batch of token ids and attention masks.
///
/// Both matrices are stored flattened in row-major order with `shape = [batch, seq]`.
/// `attention_mask` is `0` exactly at padding positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub shape: [usize; 2],
}

impl EncodedBatch {
    /// Builds a batch from per-row id sequences, right-filling each row with
    /// `pad_id` up to `seq`. Rows longer than `seq` must be cut beforehand.
    pub(crate) fn from_rows(rows: &[Vec<u32>], seq: usize, pad_id: u32) -> Self {
        let batch = rows.len();
        let mut input_ids = Vec::with_capacity(batch * seq);
        let mut attention_mask = Vec::with_capacity(batch * seq);

        for row in rows {
            debug_assert!(row.len() <= seq);
            input_ids.extend_from_slice(row);
            input_ids.extend(std::iter::repeat_n(pad_id, seq - row.len()));

            attention_mask.extend(std::iter::repeat_n(1u32, row.len()));
            attention_mask.extend(std::iter::repeat_n(0u32, seq - row.len()));
        }

        Self {
            input_ids,
            attention_mask,
            shape: [batch, seq],
        }
    }

    pub fn batch_size(&self) -> usize {
        self.shape[0]
    }

    pub fn seq_len(&self) -> usize {
        self.shape[1]
    }

    pub fn is_empty(&self) -> bool {
        self.batch_size() == 0
    }

    /// Ids of row `b`, padding included.
    pub fn ids(&self, b: usize) -> &[u32] {
        let seq = self.seq_len();
        &self.input_ids[b * seq..(b + 1) * seq]
    }

    /// Mask of row `b`.
    pub fn mask(&self, b: usize) -> &[u32] {
        let seq = self.seq_len();
        &self.attention_mask[b * seq..(b + 1) * seq]
    }

    /// Number of unmasked positions in row `b`.
    pub fn token_count(&self, b: usize) -> usize {
        self.mask(b).iter().filter(|&&m| m != 0).count()
    }

    /// Ids of row `b` at unmasked positions only.
    pub fn unpadded_ids(&self, b: usize) -> Vec<u32> {
        self.ids(b)
            .iter()
            .zip(self.mask(b))
            .filter(|(_, m)| **m != 0)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Materializes `(input_ids, attention_mask)` as `[batch, seq]` u32 tensors.
    pub fn to_tensors(&self, device: &Device) -> candle_core::Result<(Tensor, Tensor)> {
        let shape = (self.batch_size(), self.seq_len());
        let input_ids = Tensor::from_slice(&self.input_ids, shape, device)?;
        let attention_mask = Tensor::from_slice(&self.attention_mask, shape, device)?;
        Ok((input_ids, attention_mask))
    }
}
