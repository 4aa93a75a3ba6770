use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Whitespace run regex pattern is valid and should compile"));

/// Collapse OCR output into a canonical single-line string.
///
/// Newlines become spaces, every run of whitespace (Unicode aware) becomes a
/// single space, and leading/trailing whitespace is removed. Idempotent.
///
/// # Example
///
/// ```rust
/// use evalmark::text::normalize;
///
/// assert_eq!(normalize("  Light\n\n energy\t stored "), "Light energy stored");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.replace('\n', " ");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}
