//! Error types for evalmark.
//!
//! Every fallible operation in the crate returns [`EvalError`]. The variants map
//! onto the outcomes a calling layer has to distinguish:
//!
//! - `ModelAnswerNotFound`, `OcrFailure`, `EmptyExtraction` - the submission or
//!   its reference is unusable (client errors)
//! - `ScoringFailure` - the embedding model could not produce a score (server error)
//! - `Ocr` - a single OCR backend failed; the selector absorbs these while an
//!   alternate backend remains
//!
//! # Error Handling Philosophy
//!
//! **System errors MUST always bubble up unchanged:**
//! - `EvalError::Io` (from `std::io::Error`) - file system and process errors
//!
//! **Application errors are wrapped with context:**
//! - `Validation` - invalid configuration or input
//! - `Serialization` - JSON/TOML/YAML failures
//! - `Plugin` - backend lifecycle failures
//!
//! # Example
//!
//! ```rust
//! use evalmark::{EvalError, Result};
//!
//! fn load_answer(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.trim().is_empty() {
//!         return Err(EvalError::validation(format!("Model answer file is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `EvalError`.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Main error type for all evalmark operations.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Model answer not found: {id}")]
    ModelAnswerNotFound { id: i64 },

    #[error("OCR failed: {message}")]
    OcrFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR produced no readable text ({chars} characters after trimming)")]
    EmptyExtraction { chars: usize },

    #[error("Scoring failed: {message}")]
    ScoringFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR backend error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl EvalError {
    error_constructor!(ocr, Ocr);
    error_constructor!(ocr_failure, OcrFailure);
    error_constructor!(scoring, ScoringFailure);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    /// Whether the failure is attributable to the submitted input rather than
    /// to the service.
    ///
    /// Calling layers map `true` to a 4xx-style response and `false` to a
    /// 5xx-style one.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ModelAnswerNotFound { .. }
                | Self::OcrFailure { .. }
                | Self::EmptyExtraction { .. }
                | Self::Validation { .. }
        )
    }
}
