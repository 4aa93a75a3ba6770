//! Score to feedback message mapping.

/// Feedback bands as `(lower_bound, message)`, highest band first.
///
/// A score belongs to the first band whose lower bound it reaches.
pub const FEEDBACK_BANDS: &[(f64, &str)] = &[
    (90.0, "Excellent answer. Very close to the model answer."),
    (75.0, "Good answer, but a few points are missing."),
    (55.0, "Average answer. Improve explanation and include key points."),
    (f64::NEG_INFINITY, "Needs improvement. Many important points are missing."),
];

/// Map a 0-100 score to its feedback message.
///
/// # Example
///
/// ```rust
/// use evalmark::feedback::feedback;
///
/// assert_eq!(feedback(90.0), "Excellent answer. Very close to the model answer.");
/// assert_eq!(feedback(72.0), "Average answer. Improve explanation and include key points.");
/// ```
pub fn feedback(score: f64) -> &'static str {
    FEEDBACK_BANDS
        .iter()
        .find(|(lower_bound, _)| score >= *lower_bound)
        .map(|(_, message)| *message)
        // NaN compares false against every bound
        .unwrap_or(FEEDBACK_BANDS[FEEDBACK_BANDS.len() - 1].1)
}
