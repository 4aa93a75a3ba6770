//! Configuration loading and management.
//!
//! This module provides utilities for loading evaluation configuration from
//! TOML, YAML, or JSON and discovering an `evalmark.toml` in the directory hierarchy.

use crate::keywords::KeywordConfig;
use crate::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main evaluation configuration.
///
/// # Example
///
/// ```rust
/// use evalmark::core::config::EvaluationConfig;
///
/// let config = EvaluationConfig::default();
/// assert_eq!(config.min_text_chars, 3);
///
/// // let config = EvaluationConfig::from_toml_file("evalmark.toml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Extractions shorter than this (trimmed, in characters) are rejected as noise.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub keywords: KeywordConfig,
}

/// How the selector chooses among backends that all produced text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Use the first backend, in priority order, that returns non-empty text.
    #[default]
    FirstSuccess,
    /// Run every backend and keep the most confident non-empty result.
    /// Missing confidence counts as 0.0; ties go to the higher-priority backend.
    HighestConfidence,
}

/// OCR configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language code passed to backends and used when none is detected (e.g. "eng").
    #[serde(default = "default_eng")]
    pub language: String,

    #[serde(default)]
    pub policy: SelectionPolicy,

    /// Backends in priority order.
    #[serde(default = "default_backends")]
    pub backends: Vec<OcrBackendConfig>,
}

/// One entry of the OCR fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OcrBackendConfig {
    /// The `tesseract` command-line engine.
    Tesseract {
        #[serde(default = "default_tesseract_binary")]
        binary: String,
        /// Page segmentation mode (`--psm`).
        #[serde(default = "default_psm")]
        psm: u8,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// An external recognizer program (TrOCR, PaddleOCR, ...).
    ///
    /// `{path}` and `{lang}` in `args` are substituted per call.
    Command {
        engine: String,
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        /// Languages the engine handles; empty means any.
        #[serde(default)]
        languages: Vec<String>,
    },
}

/// Embedding model configuration.
///
/// Requires the `embeddings` feature to be instantiated with fastembed-rs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Preset name, see [`crate::embeddings::EMBEDDING_PRESETS`].
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Show model download progress
    #[serde(default)]
    pub show_download_progress: bool,

    /// Model cache directory. Defaults to `.evalmark/embeddings` under the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_min_text_chars() -> usize {
    3
}
fn default_eng() -> String {
    "eng".to_string()
}
fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}
fn default_psm() -> u8 {
    6
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_backends() -> Vec<OcrBackendConfig> {
    vec![OcrBackendConfig::Tesseract {
        binary: default_tesseract_binary(),
        psm: default_psm(),
        timeout_secs: default_timeout_secs(),
    }]
}
fn default_embedding_model() -> String {
    "multilingual-mini".to_string()
}
fn default_batch_size() -> usize {
    32
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            ocr: OcrConfig::default(),
            embedding: EmbeddingConfig::default(),
            keywords: KeywordConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_eng(),
            policy: SelectionPolicy::default(),
            backends: default_backends(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            show_download_progress: false,
            cache_dir: None,
        }
    }
}

impl EmbeddingConfig {
    /// Resolved model cache directory.
    pub fn cache_directory(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            let mut path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            path.push(".evalmark");
            path.push("embeddings");
            path
        })
    }
}

impl OcrBackendConfig {
    fn validate(&self) -> Result<()> {
        match self {
            OcrBackendConfig::Tesseract {
                binary, timeout_secs, ..
            } => {
                if binary.trim().is_empty() {
                    return Err(EvalError::validation("Tesseract binary cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(EvalError::validation("Tesseract timeout_secs must be greater than 0"));
                }
            }
            OcrBackendConfig::Command {
                engine,
                program,
                timeout_secs,
                ..
            } => {
                if engine.trim().is_empty() || engine.contains(char::is_whitespace) {
                    return Err(EvalError::validation(format!(
                        "OCR engine name '{}' must be non-empty and contain no whitespace",
                        engine
                    )));
                }
                if program.trim().is_empty() {
                    return Err(EvalError::validation(format!(
                        "OCR engine '{}' has an empty program",
                        engine
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(EvalError::validation(format!(
                        "OCR engine '{}' timeout_secs must be greater than 0",
                        engine
                    )));
                }
            }
        }
        Ok(())
    }
}

impl EvaluationConfig {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.min_text_chars == 0 {
            return Err(EvalError::validation("min_text_chars must be at least 1"));
        }

        if self.ocr.language.trim().is_empty() {
            return Err(EvalError::validation("OCR language cannot be empty"));
        }

        if self.ocr.backends.is_empty() {
            return Err(EvalError::validation("At least one OCR backend must be configured"));
        }

        for backend in &self.ocr.backends {
            backend.validate()?;
        }

        if crate::embeddings::get_preset(&self.embedding.model).is_none() {
            return Err(EvalError::validation(format!(
                "Unknown embedding model '{}'. Available: {}",
                self.embedding.model,
                crate::embeddings::list_presets().join(", ")
            )));
        }

        if self.embedding.batch_size == 0 {
            return Err(EvalError::validation("Embedding batch_size must be greater than 0"));
        }

        if self.keywords.max_keywords == 0 || self.keywords.min_length == 0 {
            return Err(EvalError::validation(
                "Keyword max_keywords and min_length must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::Validation` if the file doesn't exist, is invalid
    /// TOML, or fails [`EvaluationConfig::validate`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| EvalError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| EvalError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| EvalError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(EvalError::validation(format!(
                "Unsupported config file extension: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `evalmark.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(EvalError::Io)?;

        loop {
            let evalmark_toml = current.join("evalmark.toml");
            if evalmark_toml.exists() {
                return Ok(Some(Self::from_toml_file(evalmark_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| EvalError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
