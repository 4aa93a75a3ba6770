//! OCR backend plugin trait.
//!
//! This module defines the trait the OCR selector drives. Concrete backends
//! live in [`crate::ocr`].

use crate::Result;
use crate::core::config::OcrConfig;
use crate::plugins::Plugin;
use crate::types::EngineId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw output of one backend for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Recognized text, as produced by the engine (not yet normalized).
    pub text: String,

    /// Engine confidence in `[0, 1]`, when the engine reports one.
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Language tag reported by the engine, if any.
    #[serde(default)]
    pub language: Option<String>,
}

impl OcrOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            language: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Trait for OCR backend plugins.
///
/// Backends differ in strengths (printed Latin text, handwriting, non-Latin
/// scripts); the [`OcrSelector`](crate::ocr::OcrSelector) chains them and picks
/// one result. A backend reports failure through `Err`; it must not panic on
/// unreadable input.
///
/// # Example
///
/// ```rust
/// use evalmark::plugins::{OcrBackend, OcrOutput, Plugin};
/// use evalmark::{EngineId, OcrConfig, Result};
/// use async_trait::async_trait;
/// use std::path::Path;
///
/// struct FixedTextOcr;
///
/// impl Plugin for FixedTextOcr {
///     fn name(&self) -> &str { "fixed" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// #[async_trait]
/// impl OcrBackend for FixedTextOcr {
///     async fn process_file(&self, _path: &Path, _config: &OcrConfig) -> Result<OcrOutput> {
///         Ok(OcrOutput::new("Extracted text").with_confidence(0.9))
///     }
///
///     fn engine(&self) -> EngineId {
///         EngineId::Custom("fixed".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait OcrBackend: Plugin {
    /// Recognize text in the document at `path`.
    ///
    /// # Errors
    ///
    /// - `EvalError::Ocr` - the engine failed or rejected the input
    /// - `EvalError::Io` - the engine could not be started
    async fn process_file(&self, path: &Path, config: &OcrConfig) -> Result<OcrOutput>;

    /// Identifier recorded on results produced by this backend.
    fn engine(&self) -> EngineId;

    /// Whether the backend can recognize the given language code.
    ///
    /// Defaults to `true`; the selector only uses this for logging.
    fn supports_language(&self, _lang: &str) -> bool {
        true
    }

    /// Whether the backend's dependencies are present.
    ///
    /// Unavailable backends are skipped by the selector with a warning.
    /// Called before every attempt, so implementations that probe the system
    /// should cache the answer.
    async fn is_available(&self) -> bool {
        true
    }
}
