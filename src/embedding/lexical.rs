//! Deterministic token-overlap scoring, the degraded mode used when the
//! embedding provider is unreachable. Scores are Jaccard overlap of
//! lowercased alphanumeric tokens, so they land in [0, 1] and sort
//! consistently next to cosine scores.

use std::collections::HashSet;

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(|t| t.to_lowercase())
        .collect()
}

/// Shared-token overlap between two texts: |A ∩ B| / |A ∪ B|.
/// 0.0 when either side has no tokens.
pub fn overlap_score(a: &str, b: &str) -> f32 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    let union = a.len() + b.len() - shared;
    shared as f32 / union as f32
}
