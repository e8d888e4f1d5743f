use std::sync::Arc;

use tracing::{debug, info};

use crate::constants::{DEFAULT_TOP_K, EPSILON};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::pooling::pool_batch;
use crate::tokenizer::VocabTokenizer;

use super::error::EngineError;
use super::similarity::{cosine_with_norms, l2_norm, top_k_indices};
use super::types::{RankedResult, RankedSkill};

/// Ranks a fixed skill pool against query texts by cosine similarity.
///
/// The pool is embedded once, in a single batch, when the engine is built.
/// After that the engine is read-only and `rank` may be called from many
/// threads at once.
pub struct SimilarityEngine {
    tokenizer: Arc<VocabTokenizer>,
    provider: Arc<dyn EmbeddingProvider>,
    skills: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    norms: Vec<f32>,
    hidden_dim: usize,
    default_top_k: usize,
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("tokenizer", &self.tokenizer)
            .field("skills", &self.skills.len())
            .field("hidden_dim", &self.hidden_dim)
            .field("default_top_k", &self.default_top_k)
            .finish_non_exhaustive()
    }
}

impl SimilarityEngine {
    /// Embeds `skills` and caches their vectors and norms.
    ///
    /// An empty pool is rejected before the provider is called.
    pub fn new<I, S>(
        skills: I,
        tokenizer: Arc<VocabTokenizer>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let skills: Vec<String> = skills.into_iter().map(Into::into).collect();
        if skills.is_empty() {
            return Err(EngineError::invalid("skill pool must not be empty"));
        }

        let embeddings = embed_texts(&tokenizer, provider.as_ref(), &skills)?;
        let norms: Vec<f32> = embeddings.iter().map(|v| l2_norm(v)).collect();
        let hidden_dim = embeddings.first().map(Vec::len).unwrap_or_default();

        info!(
            skills = skills.len(),
            hidden_dim,
            "Similarity engine ready"
        );

        Ok(Self {
            tokenizer,
            provider,
            skills,
            embeddings,
            norms,
            hidden_dim,
            default_top_k: DEFAULT_TOP_K,
        })
    }

    /// Sets the `k` used by [`rank_default`](Self::rank_default).
    pub fn with_default_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }

    /// Returns the `min(k, pool size)` best-matching skills for `text`.
    pub fn rank(&self, text: &str, k: usize) -> Result<RankedResult, EngineError> {
        if k == 0 {
            return Err(EngineError::invalid("k must be greater than zero"));
        }
        if self.skills.is_empty() {
            return Err(EngineError::invalid("skill pool is empty"));
        }

        let query = self.embed(text)?;
        if query.len() != self.hidden_dim {
            return Err(EmbeddingError::ShapeMismatch {
                expected: vec![self.hidden_dim],
                actual: vec![query.len()],
            }
            .into());
        }
        let query_norm = l2_norm(&query);

        let scores: Vec<f32> = self
            .embeddings
            .iter()
            .zip(&self.norms)
            .map(|(skill, norm)| cosine_with_norms(skill, &query, *norm, query_norm, EPSILON))
            .collect();

        let entries: Vec<RankedSkill> = top_k_indices(&scores, k)
            .into_iter()
            .map(|index| RankedSkill {
                label: self.skills[index].clone(),
                score: scores[index],
                index,
            })
            .collect();

        debug!(
            text_len = text.len(),
            k,
            returned = entries.len(),
            top_score = entries.first().map(|e| e.score),
            "Ranked skill pool"
        );

        Ok(RankedResult::new(entries))
    }

    /// [`rank`](Self::rank) with the engine's default `k`.
    pub fn rank_default(&self, text: &str) -> Result<RankedResult, EngineError> {
        self.rank(text, self.default_top_k)
    }

    /// Pooled embedding of a single text.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let mut pooled = embed_texts(&self.tokenizer, self.provider.as_ref(), &[text])?;
        pooled.pop().ok_or_else(|| {
            EmbeddingError::InferenceFailed {
                reason: "provider returned no rows".to_string(),
            }
            .into()
        })
    }

    /// Pooled embeddings of `texts`, computed in one provider call.
    pub fn embed_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<f32>>, EngineError> {
        embed_texts(&self.tokenizer, self.provider.as_ref(), texts)
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Hidden size reported by the provider when the pool was embedded.
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Cached embedding of the skill at pool position `index`.
    pub fn skill_embedding(&self, index: usize) -> Option<&[f32]> {
        self.embeddings.get(index).map(Vec::as_slice)
    }

    /// Cached L2 norm of the skill at pool position `index`.
    pub fn skill_norm(&self, index: usize) -> Option<f32> {
        self.norms.get(index).copied()
    }

    pub fn tokenizer(&self) -> &Arc<VocabTokenizer> {
        &self.tokenizer
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }
}

/// encode → provider → pool for a non-empty list of texts.
fn embed_texts<S: AsRef<str>>(
    tokenizer: &VocabTokenizer,
    provider: &dyn EmbeddingProvider,
    texts: &[S],
) -> Result<Vec<Vec<f32>>, EngineError> {
    if texts.is_empty() {
        return Err(EngineError::invalid("text list must not be empty"));
    }

    let batch = tokenizer.encode(texts, true, true);
    let token_embeddings = provider.forward(&batch)?;
    let pooled = pool_batch(&token_embeddings, &batch)?;

    if pooled.len() != texts.len() {
        return Err(EmbeddingError::ShapeMismatch {
            expected: vec![texts.len()],
            actual: vec![pooled.len()],
        }
        .into());
    }

    Ok(pooled)
}
