//! OCR backends and the selector that arbitrates between them.
//!
//! Scanned answer sheets mix printed text, handwriting and non-Latin scripts,
//! and no single engine handles all of them. [`OcrSelector`] runs a
//! priority-ordered chain of [`OcrBackend`](crate::plugins::OcrBackend)s:
//!
//! - [`TesseractBackend`] - the `tesseract` CLI, printed Latin-script text
//! - [`CommandBackend`] - any external recognizer (TrOCR, PaddleOCR scripts)
//!
//! # Example
//!
//! ```rust,no_run
//! use evalmark::ocr::OcrSelector;
//! use evalmark::OcrConfig;
//!
//! # async fn example() -> evalmark::Result<()> {
//! let selector = OcrSelector::from_config(&OcrConfig::default())?;
//! let result = selector.extract("answer_sheet.png").await?;
//! println!("{} read: {}", result.engine, result.extracted_text);
//! # Ok(())
//! # }
//! ```

pub mod command_backend;
pub mod selector;
mod subprocess;
pub mod tesseract_backend;

pub use command_backend::CommandBackend;
pub use selector::OcrSelector;
pub use tesseract_backend::TesseractBackend;
