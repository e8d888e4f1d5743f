use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BOS_ID, DEFAULT_BOS_TOKEN, DEFAULT_EOS_ID, DEFAULT_EOS_TOKEN, DEFAULT_ID_OFFSET,
    DEFAULT_MAX_SEQ_LEN, DEFAULT_PAD_ID, DEFAULT_PAD_TOKEN, DEFAULT_UNK_ID, DEFAULT_UNK_TOKEN,
};

use super::error::TokenizerError;

/// Surface strings of the four reserved tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokens {
    pub pad: String,
    pub unk: String,
    pub bos: String,
    pub eos: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: DEFAULT_PAD_TOKEN.to_string(),
            unk: DEFAULT_UNK_TOKEN.to_string(),
            bos: DEFAULT_BOS_TOKEN.to_string(),
            eos: DEFAULT_EOS_TOKEN.to_string(),
        }
    }
}

impl SpecialTokens {
    /// Returns `true` if `piece` is one of the reserved surface strings.
    pub fn contains(&self, piece: &str) -> bool {
        piece == self.pad || piece == self.unk || piece == self.bos || piece == self.eos
    }
}

/// Ids emitted for the reserved tokens. These are never shifted by the id offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokenIds {
    pub pad: u32,
    pub unk: u32,
    pub bos: u32,
    pub eos: u32,
}

impl Default for SpecialTokenIds {
    fn default() -> Self {
        Self {
            pad: DEFAULT_PAD_ID,
            unk: DEFAULT_UNK_ID,
            bos: DEFAULT_BOS_ID,
            eos: DEFAULT_EOS_ID,
        }
    }
}

impl SpecialTokenIds {
    /// Returns the reserved-token name for `id`, if any.
    pub fn reserved_name(&self, id: u32) -> Option<&'static str> {
        if id == self.pad {
            Some("pad")
        } else if id == self.unk {
            Some("unk")
        } else if id == self.bos {
            Some("bos")
        } else if id == self.eos {
            Some("eos")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
/// Configuration for [`VocabTokenizer`](super::VocabTokenizer).
pub struct TokenizerConfig {
    /// Path to a line-oriented `.vocab` file or a `tokenizer.json`.
    pub vocab_path: PathBuf,
    /// Max tokens per sequence, begin/end markers included.
    pub max_seq_len: usize,
    /// Added to every raw vocabulary id.
    pub id_offset: u32,
    /// Reserved token strings, excluded from content matching.
    pub special_tokens: SpecialTokens,
    /// Reserved token ids.
    pub special_ids: SpecialTokenIds,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            vocab_path: PathBuf::new(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            id_offset: DEFAULT_ID_OFFSET,
            special_tokens: SpecialTokens::default(),
            special_ids: SpecialTokenIds::default(),
        }
    }
}

impl TokenizerConfig {
    /// Creates a config for a vocabulary file with default limits.
    pub fn new<P: Into<PathBuf>>(vocab_path: P) -> Self {
        Self {
            vocab_path: vocab_path.into(),
            ..Default::default()
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_id_offset(mut self, id_offset: u32) -> Self {
        self.id_offset = id_offset;
        self
    }

    /// Returns `true` if the vocabulary should be read as a HuggingFace `tokenizer.json`.
    pub fn is_tokenizer_json(&self) -> bool {
        self.vocab_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    pub fn validate(&self) -> Result<(), TokenizerError> {
        if self.max_seq_len == 0 {
            return Err(TokenizerError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
