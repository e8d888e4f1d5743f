//! Vector math for ranking.

#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// `dot(a, b) / (‖a‖·‖b‖ + epsilon)`. Both slices must have the same length.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32], epsilon: f32) -> f32 {
    cosine_with_norms(a, b, l2_norm(a), l2_norm(b), epsilon)
}

/// [`cosine_similarity`] with precomputed norms.
#[inline]
pub fn cosine_with_norms(a: &[f32], b: &[f32], norm_a: f32, norm_b: f32, epsilon: f32) -> f32 {
    dot(a, b) / (norm_a * norm_b + epsilon)
}

/// Sort key for a score: NaN ranks below every number, `-0.0` equals `0.0`.
#[inline]
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else if score == 0.0 {
        0.0
    } else {
        score
    }
}

/// Indices of the `k` highest scores, best first, ties in index order.
/// NaN scores rank last.
///
/// Uses a partial selection when `k` is smaller than `scores.len()`, so only
/// the selected prefix is sorted.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }

    let by_rank = |a: &usize, b: &usize| {
        rank_key(scores[*b])
            .total_cmp(&rank_key(scores[*a]))
            .then_with(|| a.cmp(b))
    };

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, by_rank);
        indices.truncate(k);
    }
    indices.sort_unstable_by(by_rank);
    indices
}
