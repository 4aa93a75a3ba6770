//! Records flowing through the evaluation pipeline.

use crate::{EvalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Reference answer a submission is graded against.
///
/// Model answers are created administratively and never mutated by the
/// pipeline. `model_text` is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnswer {
    pub id: i64,
    pub question_title: String,
    pub model_text: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ModelAnswer {
    /// Create a model answer, rejecting blank reference text.
    pub fn new(id: i64, question_title: impl Into<String>, model_text: impl Into<String>) -> Result<Self> {
        let model_text = model_text.into();
        if model_text.trim().is_empty() {
            return Err(EvalError::validation(format!("Model answer {} has empty model text", id)));
        }

        Ok(Self {
            id,
            question_title: question_title.into(),
            model_text,
            created_at: Utc::now(),
        })
    }

    /// Check the non-empty invariant on values that bypassed [`ModelAnswer::new`]
    /// (e.g. deserialized ones).
    pub fn validate(&self) -> Result<()> {
        if self.model_text.trim().is_empty() {
            return Err(EvalError::validation(format!(
                "Model answer {} has empty model text",
                self.id
            )));
        }
        Ok(())
    }
}

/// A single evaluation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub document_path: String,
    pub model_answer_id: i64,
}

/// Identifies which OCR backend produced a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineId {
    /// Tesseract, printed Latin-script text
    Tesseract,
    /// TrOCR transformer model, handwriting
    TrOcr,
    /// PaddleOCR, multilingual and non-Latin scripts
    Paddle,
    /// Any other backend, by name
    Custom(String),
}

impl EngineId {
    pub fn as_str(&self) -> &str {
        match self {
            EngineId::Tesseract => "tesseract",
            EngineId::TrOcr => "trocr",
            EngineId::Paddle => "paddle",
            EngineId::Custom(name) => name,
        }
    }

    /// Parse an engine name. Unknown names become [`EngineId::Custom`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "tesseract" => EngineId::Tesseract,
            "trocr" => EngineId::TrOcr,
            "paddle" | "paddleocr" => EngineId::Paddle,
            other => EngineId::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EngineId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EngineId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EngineId::parse(&name))
    }
}

/// Text chosen by the OCR selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub extracted_text: String,
    pub engine: EngineId,
    pub detected_language: String,
}

/// Terminal artifact of one evaluation.
///
/// Built by [`Evaluator`](crate::Evaluator), which keeps `score` within
/// `0..=100`. Values assembled by hand carry no such guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub extracted_text: String,
    pub score: f64,
    pub feedback: String,
    pub missing_keywords: Vec<String>,
    pub ocr_engine: EngineId,
    pub language: String,
}

impl EvaluationOutcome {
    pub(crate) fn assemble(ocr: OcrResult, score: f64, feedback: &str, missing_keywords: Vec<String>) -> Self {
        Self {
            extracted_text: ocr.extracted_text,
            score: score.clamp(0.0, 100.0),
            feedback: feedback.to_string(),
            missing_keywords,
            ocr_engine: ocr.engine,
            language: ocr.detected_language,
        }
    }
}

/// Response shape exposed by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub text: String,
    pub score: f64,
    pub feedback: String,
    pub language: String,
    pub ocr_engine: String,
    pub missing_keywords: Vec<String>,
}

impl From<&EvaluationOutcome> for EvaluationResponse {
    fn from(outcome: &EvaluationOutcome) -> Self {
        Self {
            text: outcome.extracted_text.clone(),
            score: outcome.score,
            feedback: outcome.feedback.clone(),
            language: outcome.language.clone(),
            ocr_engine: outcome.ocr_engine.to_string(),
            missing_keywords: outcome.missing_keywords.clone(),
        }
    }
}

/// Row handed to the result sink after a successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub document_path: String,
    pub model_answer_id: i64,
    pub outcome: EvaluationOutcome,
    pub created_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn new(input: &EvaluationInput, outcome: EvaluationOutcome) -> Self {
        Self {
            document_path: input.document_path.clone(),
            model_answer_id: input.model_answer_id,
            outcome,
            created_at: Utc::now(),
        }
    }

    /// Missing keywords in their persisted form: comma-joined, `None` when empty.
    pub fn missing_keywords_column(&self) -> Option<String> {
        if self.outcome.missing_keywords.is_empty() {
            None
        } else {
            Some(self.outcome.missing_keywords.join(","))
        }
    }
}
