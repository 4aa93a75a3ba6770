//! evalmark - answer evaluation pipeline
//!
//! evalmark grades a submitted answer sheet against a reference "model answer".
//! It reads the document with OCR, scores the recognized text for semantic
//! closeness, lists key terms the answer misses, and attaches feedback.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use evalmark::{EvaluationConfig, Evaluator, ModelAnswer};
//!
//! # fn main() -> evalmark::Result<()> {
//! let evaluator = Evaluator::from_config(EvaluationConfig::default())?;
//! let answer = ModelAnswer::new(
//!     1,
//!     "Photosynthesis",
//!     "Photosynthesis converts light energy into chemical energy stored in glucose",
//! )?;
//!
//! let outcome = evaluator.evaluate_sync("answer_sheet.png", &answer)?;
//! println!("{:.2} - {}", outcome.score, outcome.feedback);
//! println!("missing: {}", outcome.missing_keywords.join(", "));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Text** (`text`): whitespace normalization of OCR output
//! - **OCR** (`ocr`, `plugins`): pluggable backends behind a fallback selector
//! - **Scoring** (`scoring`, `embeddings`): cosine similarity blended with answer length
//! - **Keywords** (`keywords`) and **Feedback** (`feedback`)
//! - **Core** (`core`): configuration and the [`Evaluator`]
//! - **Store** (`store`): model answer lookup and result hand-off boundaries
//!
//! # Features
//!
//! - `language-detection` (default): tag results with a detected language
//! - `embeddings`: local multilingual sentence embeddings via fastembed-rs
//! - `otel`: tracing spans on the evaluation entry points

#![deny(unsafe_code)]

pub mod core;
pub mod embeddings;
pub mod error;
pub mod feedback;
pub mod keywords;
pub mod ocr;
pub mod plugins;
pub mod scoring;
pub mod store;
pub mod text;
pub mod types;

#[cfg(feature = "language-detection")]
pub mod language_detection;

pub use error::{EvalError, Result};
pub use types::*;

pub use core::config::{EmbeddingConfig, EvaluationConfig, OcrBackendConfig, OcrConfig, SelectionPolicy};
pub use core::evaluator::Evaluator;

pub use embeddings::Embedder;
pub use ocr::OcrSelector;
pub use scoring::SemanticScorer;
pub use store::{InMemoryStore, ModelAnswerStore, ResultSink};

#[cfg(feature = "embeddings")]
pub use embeddings::FastEmbedder;
