//! Cosine-similarity ranking of a fixed skill pool.
//!
//! [`SimilarityEngine`] composes the tokenizer, an embedding provider and mean
//! pooling. The pool is embedded once at construction; each query is embedded
//! on demand and compared against the cached vectors with
//! `dot(skill, query) / (‖skill‖·‖query‖ + ε)`.

pub mod engine;
pub mod error;
pub mod similarity;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::SimilarityEngine;
pub use error::EngineError;
pub use similarity::{cosine_similarity, cosine_with_norms, dot, l2_norm, top_k_indices};
pub use types::{RankedResult, RankedSkill};
