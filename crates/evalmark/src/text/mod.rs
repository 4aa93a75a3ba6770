//! Text utilities applied to OCR output before scoring.

pub mod normalize;

pub use normalize::normalize;
