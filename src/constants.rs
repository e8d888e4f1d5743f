//! Cross-cutting, shared constants.
//!
//! The reserved ids and id offset default to the layout used by XLM-RoBERTa
//! derived models (BGE-M3 and friends), whose SentencePiece ids are shifted by
//! one relative to the raw `.vocab` line index.

/// Default maximum encoded sequence length (including begin/end markers).
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Offset added to every raw vocabulary id before it is emitted.
pub const DEFAULT_ID_OFFSET: u32 = 1;

pub const DEFAULT_BOS_ID: u32 = 0;
pub const DEFAULT_PAD_ID: u32 = 1;
pub const DEFAULT_EOS_ID: u32 = 2;
pub const DEFAULT_UNK_ID: u32 = 3;

pub const DEFAULT_PAD_TOKEN: &str = "<pad>";
pub const DEFAULT_UNK_TOKEN: &str = "<unk>";
pub const DEFAULT_BOS_TOKEN: &str = "<s>";
pub const DEFAULT_EOS_TOKEN: &str = "</s>";

/// Word-boundary marker substituted for whitespace before matching.
pub const WORD_BOUNDARY: char = '\u{2581}';

/// Guard against division by zero in pooling and cosine similarity.
pub const EPSILON: f32 = 1e-9;

/// Number of results returned by [`SimilarityEngine::rank_default`](crate::ranking::SimilarityEngine::rank_default).
pub const DEFAULT_TOP_K: usize = 5;

/// Hidden dimension used by the stub provider when nothing else is configured.
pub const DEFAULT_STUB_DIM: usize = 384;

/// Support categories used when no skill pool is configured.
pub const DEFAULT_SKILLS: &[&str] = &[
    "General Database Issues",
    "AI System Related Issues",
    "Operating System Related Issues",
    "Application Software Related Issues",
    "Network Issues",
    "Hardware Malfunctions",
    "Billing Issues",
    "Payment Issues",
    "Subscription Issues",
    "Staff Issues",
    "Legal Issues",
];
