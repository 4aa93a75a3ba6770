//! Core evaluation orchestration.
//!
//! - **Configuration**: loading [`EvaluationConfig`] from TOML, YAML or JSON
//! - **Evaluator**: the [`Evaluator`] entry point tying OCR, scoring, keywords
//!   and feedback together
//!
//! # Example
//!
//! ```rust,no_run
//! use evalmark::core::config::EvaluationConfig;
//! use evalmark::core::evaluator::Evaluator;
//!
//! # fn example() -> evalmark::Result<()> {
//! let config = EvaluationConfig::discover()?.unwrap_or_default();
//! let evaluator = Evaluator::from_config(config)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod evaluator;

pub use config::{EmbeddingConfig, EvaluationConfig, OcrBackendConfig, OcrConfig, SelectionPolicy};
pub use evaluator::Evaluator;
