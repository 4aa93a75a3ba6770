//! Language detection using whatlang library.
//!
//! Used to tag OCR results with a language when the engine does not report one.

use whatlang::detect;

/// Minimum whatlang confidence for a detection to be accepted.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Detect the primary language of `text`.
///
/// Returns an ISO 639-3 code (e.g. `"eng"`, `"hin"`), or `None` when the text is
/// blank or no language clears [`MIN_CONFIDENCE`].
///
/// # Example
///
/// ```rust
/// use evalmark::language_detection::detect_language;
///
/// let lang = detect_language("The mitochondria is the powerhouse of the cell and produces energy.");
/// assert_eq!(lang.as_deref(), Some("eng"));
/// ```
pub fn detect_language(text: &str) -> Option<String> {
    detect_language_with(text, MIN_CONFIDENCE)
}

pub fn detect_language_with(text: &str, min_confidence: f64) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let info = detect(text)?;
    if info.confidence() < min_confidence {
        tracing::debug!(
            "Language detection below threshold: {:?} at {:.2}",
            info.lang(),
            info.confidence()
        );
        return None;
    }

    Some(info.lang().code().to_string())
}
