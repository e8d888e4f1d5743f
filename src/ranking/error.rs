use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::tokenizer::TokenizerError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl EngineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures loading or embedding through a collaborator.
    pub fn is_load_error(&self) -> bool {
        matches!(self, EngineError::Tokenizer(_) | EngineError::Embedding(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, EngineError::InvalidArgument { .. })
    }
}
