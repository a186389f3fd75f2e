// Embedding provider abstraction. The ranker only sees the trait; the
// backend (local Ollama or a hosted OpenAI-compatible endpoint) is picked
// once at startup from config.

pub mod lexical;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;

use crate::error::AppError;

/// Capability interface for turning text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;
}

/// Cosine similarity between two vectors, 0.0 when either has zero norm
/// (covers empty text and length-mismatched backends without panicking).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.5, -1.2, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_is_zero_not_nan() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn similarity_stays_in_bounds() {
        let a = vec![3.1, -2.7, 0.4, 9.9];
        let b = vec![-1.5, 4.2, 8.8, -0.3];
        let sim = cosine_similarity(&a, &b);
        assert!((-1.0..=1.0).contains(&sim));
    }
}
