//! Semantic similarity scoring.
//!
//! A score blends meaning and completeness:
//!
//! 1. both texts are embedded and compared by cosine similarity, clamped to `[0, 1]`
//! 2. `base = similarity * 100`
//! 3. `ratio = min(chars(student) / max(chars(model), 1), 1)`
//! 4. `score = base * (0.6 + 0.4 * ratio)`, rounded to two decimals
//!
//! A short answer that says the right thing therefore keeps at least 60% of its
//! semantic score.

use crate::embeddings::Embedder;
use crate::{EvalError, Result};
use std::sync::Arc;

/// Weight of the semantic part that is independent of answer length.
const BASE_WEIGHT: f64 = 0.6;
/// Weight of the length-completeness part.
const LENGTH_WEIGHT: f64 = 0.4;

/// Scores student text against model text using a shared embedding model.
#[derive(Clone)]
pub struct SemanticScorer {
    embedder: Arc<dyn Embedder>,
}

impl SemanticScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Score `student_text` against `model_text` on a 0-100 scale.
    ///
    /// Blocking: runs model inference on the calling thread.
    ///
    /// # Errors
    ///
    /// - `EvalError::Validation` - `model_text` is blank
    /// - `EvalError::ScoringFailure` - the embedder failed or returned unusable vectors
    pub fn score(&self, student_text: &str, model_text: &str) -> Result<f64> {
        if model_text.trim().is_empty() {
            return Err(EvalError::validation("Model text cannot be empty"));
        }

        let vectors = self
            .embedder
            .embed(&[student_text, model_text])
            .map_err(|e| match e {
                EvalError::ScoringFailure { .. } => e,
                other => EvalError::scoring_with_source("Embedding model failed", other),
            })?;

        let [student_vec, model_vec] = vectors.as_slice() else {
            return Err(EvalError::scoring(format!(
                "Embedding model returned {} vectors for 2 texts",
                vectors.len()
            )));
        };

        if student_vec.is_empty() || student_vec.len() != model_vec.len() {
            return Err(EvalError::scoring(format!(
                "Embedding dimensions do not match ({} vs {})",
                student_vec.len(),
                model_vec.len()
            )));
        }

        let similarity = cosine_similarity(student_vec, model_vec);
        let score = blend_score(
            similarity,
            student_text.chars().count(),
            model_text.chars().count(),
        );

        tracing::debug!(
            "Scored answer with {}: similarity {:.4}, score {:.2}",
            self.embedder.model_name(),
            similarity,
            score
        );

        Ok(score)
    }
}

/// Cosine similarity of two vectors in `[-1, 1]`.
///
/// Returns `0.0` for zero vectors or mismatched lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Combine a similarity and the two text lengths (in characters) into a 0-100 score.
///
/// The result is rounded to two decimals with ties going to the even digit.
///
/// # Example
///
/// ```rust
/// use evalmark::scoring::blend_score;
///
/// // 90% similar, half as long as the model answer
/// assert_eq!(blend_score(0.9, 50, 100), 72.0);
/// assert_eq!(blend_score(1.0, 120, 100), 100.0);
/// ```
pub fn blend_score(similarity: f64, student_len: usize, model_len: usize) -> f64 {
    let similarity = if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    };
    let base = similarity * 100.0;

    let ratio = (student_len as f64 / model_len.max(1) as f64).min(1.0);
    let score = base * (BASE_WEIGHT + LENGTH_WEIGHT * ratio);

    round_to_cents(score).clamp(0.0, 100.0)
}

/// Round to two decimals, ties to even.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
