use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a vocabulary or building a tokenizer.
///
/// Encoding itself never fails; every variant here is a load-time error.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("vocabulary not found at path: {path}")]
    VocabNotFound { path: PathBuf },

    #[error("failed to read vocabulary {path}: {reason}")]
    VocabReadFailed { path: PathBuf, reason: String },

    #[error("malformed vocabulary at line {line}: {reason}")]
    VocabParse { line: usize, reason: String },

    #[error("duplicate vocabulary piece '{piece}'")]
    DuplicatePiece { piece: String },

    #[error("piece '{piece}' maps to id {id}, which is reserved for {reserved}")]
    IdCollision {
        piece: String,
        id: u32,
        reserved: &'static str,
    },

    #[error("invalid tokenizer configuration: {reason}")]
    InvalidConfig { reason: String },
}
