//! Vocabulary tokenizer.
//!
//! Text is normalized (whitespace becomes a `▁` word-boundary marker), then
//! split by greedy longest-prefix matching against a [`Vocabulary`]. Unmatched
//! characters become the unknown token one char at a time. Every sequence is
//! wrapped in begin/end markers and batches are right-padded into an
//! [`EncodedBatch`].
//!
//! Use [`VocabTokenizer::load`] for a vocabulary on disk, or
//! [`VocabTokenizer::new`] with an in-memory [`Vocabulary`].

mod batch;
/// Tokenizer configuration.
pub mod config;
mod error;
mod vocab;


pub use batch::EncodedBatch;
pub use config::{SpecialTokenIds, SpecialTokens, TokenizerConfig};
pub use error::TokenizerError;
pub use vocab::Vocabulary;

use std::sync::Arc;

use tracing::{debug, info};

use crate::constants::WORD_BOUNDARY;

/// Deterministic text → token-id batch mapping over a shared [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct VocabTokenizer {
    vocab: Arc<Vocabulary>,
    max_seq_len: usize,
    id_offset: u32,
}

impl VocabTokenizer {
    /// Loads the vocabulary named by `config` and builds a tokenizer around it.
    pub fn load(config: TokenizerConfig) -> Result<Self, TokenizerError> {
        config.validate()?;

        let vocab = if config.is_tokenizer_json() {
            Vocabulary::from_tokenizer_json(
                &config.vocab_path,
                &config.special_tokens,
                config.special_ids,
            )?
        } else {
            Vocabulary::from_vocab_file(
                &config.vocab_path,
                &config.special_tokens,
                config.special_ids,
            )?
        };

        let tokenizer = Self::new(Arc::new(vocab), config.max_seq_len, config.id_offset)?;

        info!(
            vocab_path = %config.vocab_path.display(),
            vocab_size = tokenizer.vocab.len(),
            max_seq_len = tokenizer.max_seq_len,
            id_offset = tokenizer.id_offset,
            "Tokenizer loaded"
        );

        Ok(tokenizer)
    }

    /// Builds a tokenizer over an already-loaded vocabulary.
    ///
    /// Fails if a shifted content id lands on a reserved id.
    pub fn new(
        vocab: Arc<Vocabulary>,
        max_seq_len: usize,
        id_offset: u32,
    ) -> Result<Self, TokenizerError> {
        if max_seq_len == 0 {
            return Err(TokenizerError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        let special_ids = vocab.special_ids();
        for (piece, raw_id) in vocab.pieces() {
            let id = raw_id
                .checked_add(id_offset)
                .ok_or_else(|| TokenizerError::InvalidConfig {
                    reason: format!("id offset {} overflows id of '{}'", id_offset, piece),
                })?;

            if let Some(reserved) = special_ids.reserved_name(id) {
                return Err(TokenizerError::IdCollision {
                    piece: piece.to_string(),
                    id,
                    reserved,
                });
            }
        }

        Ok(Self {
            vocab,
            max_seq_len,
            id_offset,
        })
    }

    /// Encodes a batch of texts.
    ///
    /// With `padding`, `seq` is the longest row; otherwise it is `max_seq_len`.
    /// Rows are always right-filled with the pad id so the batch stays rectangular.
    /// With `truncation`, rows longer than `max_seq_len` are cut, which can drop
    /// the end marker.
    pub fn encode<S: AsRef<str>>(
        &self,
        texts: &[S],
        padding: bool,
        truncation: bool,
    ) -> EncodedBatch {
        let mut rows: Vec<Vec<u32>> = texts
            .iter()
            .map(|text| self.encode_sequence(text.as_ref()))
            .collect();

        if truncation {
            for row in &mut rows {
                row.truncate(self.max_seq_len);
            }
        }

        let longest = rows.iter().map(Vec::len).max().unwrap_or(0);
        let seq = if padding {
            longest
        } else {
            self.max_seq_len.max(longest)
        };

        let batch = EncodedBatch::from_rows(&rows, seq, self.vocab.special_ids().pad);

        debug!(
            batch = batch.batch_size(),
            seq = batch.seq_len(),
            padding,
            truncation,
            "Encoded batch"
        );

        batch
    }

    /// Encodes a single text with padding and truncation enabled.
    pub fn encode_one(&self, text: &str) -> EncodedBatch {
        self.encode(&[text], true, true)
    }

    /// Returns `[bos, content..., eos]` for one text, with content capped so the
    /// sequence fits in `max_seq_len` when possible.
    pub fn encode_sequence(&self, text: &str) -> Vec<u32> {
        let special_ids = self.vocab.special_ids();
        let budget = self.max_seq_len.saturating_sub(2);

        let mut ids = Vec::with_capacity(budget.min(text.len() + 1) + 2);
        ids.push(special_ids.bos);
        self.push_content_ids(text, budget, &mut ids);
        ids.push(special_ids.eos);
        ids
    }

    /// Returns the shifted content ids for `text` without markers or length cap.
    pub fn tokenize(&self, text: &str) -> Vec<u32> {
        let mut ids = Vec::new();
        self.push_content_ids(text, usize::MAX, &mut ids);
        ids
    }

    fn push_content_ids(&self, text: &str, budget: usize, out: &mut Vec<u32>) {
        let normalized = normalize_whitespace(text);
        let bounds: Vec<usize> = normalized
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(normalized.len()))
            .collect();
        let char_count = bounds.len() - 1;
        let unk = self.vocab.special_ids().unk;

        let mut pos = 0;
        let mut emitted = 0;
        while pos < char_count && emitted < budget {
            let longest = self.vocab.max_piece_chars().min(char_count - pos);

            let matched = (1..=longest).rev().find_map(|span| {
                let piece = &normalized[bounds[pos]..bounds[pos + span]];
                self.vocab
                    .get(piece)
                    .map(|raw_id| (raw_id + self.id_offset, span))
            });

            let (id, span) = matched.unwrap_or((unk, 1));
            out.push(id);
            pos += span;
            emitted += 1;
        }
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    pub fn id_offset(&self) -> u32 {
        self.id_offset
    }

    pub fn special_ids(&self) -> SpecialTokenIds {
        self.vocab.special_ids()
    }
}

/// Collapses whitespace runs and prefixes every word with the boundary marker.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for word in text.split_whitespace() {
        out.push(WORD_BOUNDARY);
        out.push_str(word);
    }
    out
}
