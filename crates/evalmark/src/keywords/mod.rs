//! Keyword extraction and gap detection.
//!
//! Keywords are the longest distinct alphabetic words of the model answer, a
//! cheap stand-in for "salient technical terms". A keyword counts as covered
//! when it occurs anywhere in the lowercased student text, **as a substring**:
//! `"cell"` is covered by `"cellular"`. Partial-word overlaps can therefore hide
//! a genuinely missing concept; this is known behaviour, not whole-word matching.
//!
//! # Example
//!
//! ```rust
//! use evalmark::keywords::{extract_keywords, missing_keywords};
//!
//! let model = "Photosynthesis converts light energy into chemical energy stored in glucose";
//! let keywords = extract_keywords(model);
//! assert_eq!(keywords[0], "photosynthesis");
//!
//! let missing = missing_keywords("Plants make glucose from light", model);
//! assert!(missing.contains(&"chemical".to_string()));
//! assert!(!missing.contains(&"glucose".to_string()));
//! ```

pub mod config;

pub use config::KeywordConfig;

use std::collections::BTreeSet;

/// Extract up to 10 keywords (length ≥ 4) from `model_text`.
pub fn extract_keywords(model_text: &str) -> Vec<String> {
    extract_keywords_with(model_text, &KeywordConfig::default())
}

/// Extract keywords using explicit limits.
///
/// Tokens are ASCII alphabetic runs of the lowercased text, deduplicated and
/// ordered by length descending. Equal lengths are ordered alphabetically so the
/// result is deterministic.
pub fn extract_keywords_with(model_text: &str, config: &KeywordConfig) -> Vec<String> {
    let lowered = model_text.to_lowercase();

    let unique: BTreeSet<&str> = lowered
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| token.len() >= config.min_length)
        .collect();

    let mut keywords: Vec<String> = unique.into_iter().map(str::to_string).collect();
    // stable sort keeps the BTreeSet's alphabetical order within one length
    keywords.sort_by(|a, b| b.len().cmp(&a.len()));
    keywords.truncate(config.max_keywords);

    tracing::debug!("Extracted {} keywords from model answer", keywords.len());
    keywords
}

/// Keywords of `model_text` that do not occur in `student_text`.
///
/// Order follows [`extract_keywords`]. The result is always a subset of it.
pub fn missing_keywords(student_text: &str, model_text: &str) -> Vec<String> {
    missing_keywords_with(student_text, model_text, &KeywordConfig::default())
}

pub fn missing_keywords_with(student_text: &str, model_text: &str, config: &KeywordConfig) -> Vec<String> {
    let student_lower = student_text.to_lowercase();

    extract_keywords_with(model_text, config)
        .into_iter()
        .filter(|keyword| !student_lower.contains(keyword.as_str()))
        .collect()
}
