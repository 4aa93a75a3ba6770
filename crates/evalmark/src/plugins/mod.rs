//! Plugin traits for the pipeline's external engines.
//!
//! - [`Plugin`] - base lifecycle trait
//! - [`OcrBackend`] - OCR engines driven by the selector
//!
//! Plugins are shared as `Arc<dyn Trait>`, so one backend instance can serve
//! concurrent evaluations.

pub mod ocr;
pub mod traits;

pub use ocr::{OcrBackend, OcrOutput};
pub use traits::Plugin;
