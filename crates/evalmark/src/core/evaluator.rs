//! Evaluation orchestration.
//!
//! [`Evaluator`] sequences the pipeline for one submission:
//! OCR, rejection of unreadable scans, semantic scoring, then feedback and
//! keyword gaps. It owns no mutable state; clones share the same OCR chain and
//! embedding model.

use crate::core::config::{EmbeddingConfig, EvaluationConfig};
use crate::embeddings::Embedder;
use crate::feedback::feedback;
use crate::keywords::missing_keywords_with;
use crate::ocr::OcrSelector;
use crate::scoring::SemanticScorer;
use crate::store::{ModelAnswerStore, ResultSink};
use crate::types::{EvaluationInput, EvaluationOutcome, EvaluationRecord, ModelAnswer};
use crate::{EvalError, Result};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;

/// Global Tokio runtime for synchronous operations.
///
/// Created once and reused by every `*_sync` call.
static GLOBAL_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create global Tokio runtime - system may be out of resources")
});

/// Grades submitted documents against model answers.
///
/// # Example
///
/// ```rust,no_run
/// use evalmark::core::config::EvaluationConfig;
/// use evalmark::core::evaluator::Evaluator;
/// use evalmark::ModelAnswer;
///
/// # async fn example() -> evalmark::Result<()> {
/// let evaluator = Evaluator::from_config(EvaluationConfig::default())?;
/// let answer = ModelAnswer::new(1, "Photosynthesis", "Plants convert light energy into chemical energy")?;
///
/// let outcome = evaluator.evaluate("answer_sheet.png", &answer).await?;
/// println!("{:.2}: {}", outcome.score, outcome.feedback);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Evaluator {
    selector: Arc<OcrSelector>,
    scorer: SemanticScorer,
    config: Arc<EvaluationConfig>,
}

impl Evaluator {
    pub fn new(selector: OcrSelector, scorer: SemanticScorer, config: EvaluationConfig) -> Self {
        Self {
            selector: Arc::new(selector),
            scorer,
            config: Arc::new(config),
        }
    }

    /// Build the OCR chain and load the embedding model described by `config`.
    ///
    /// Loading the model may download it on first use.
    ///
    /// # Errors
    ///
    /// - `EvalError::Validation` - invalid configuration
    /// - `EvalError::MissingDependency` - built without the `embeddings` feature
    pub fn from_config(config: EvaluationConfig) -> Result<Self> {
        config.validate()?;

        let selector = OcrSelector::from_config(&config.ocr)?;
        selector.initialize()?;

        let scorer = SemanticScorer::new(load_embedder(&config.embedding)?);

        Ok(Self::new(selector, scorer, config))
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn selector(&self) -> &OcrSelector {
        &self.selector
    }

    pub fn scorer(&self) -> &SemanticScorer {
        &self.scorer
    }

    /// Evaluate the document at `document_path` against `model_answer`.
    ///
    /// # Errors
    ///
    /// - `EvalError::Validation` - the model answer has blank text
    /// - `EvalError::OcrFailure` - no OCR backend produced text
    /// - `EvalError::EmptyExtraction` - the recognized text is shorter than `min_text_chars`
    /// - `EvalError::ScoringFailure` - the embedding model failed
    #[cfg_attr(feature = "otel", tracing::instrument(
        skip(self, document_path, model_answer),
        fields(
            evaluation.path = %document_path.as_ref().display(),
            evaluation.model_answer_id = model_answer.id,
        )
    ))]
    pub async fn evaluate(
        &self,
        document_path: impl AsRef<Path>,
        model_answer: &ModelAnswer,
    ) -> Result<EvaluationOutcome> {
        let path = document_path.as_ref();
        model_answer.validate()?;

        let ocr = self.selector.extract(path).await?;

        let chars = ocr.extracted_text.trim().chars().count();
        if chars < self.config.min_text_chars {
            tracing::debug!(
                "Rejecting {}: {} characters extracted, {} required",
                path.display(),
                chars,
                self.config.min_text_chars
            );
            return Err(EvalError::EmptyExtraction { chars });
        }

        let score = {
            let scorer = self.scorer.clone();
            let student_text = ocr.extracted_text.clone();
            let model_text = model_answer.model_text.clone();

            tokio::task::spawn_blocking(move || scorer.score(&student_text, &model_text))
                .await
                .map_err(|e| EvalError::scoring_with_source("Scoring task failed", e))??
        };

        let (message, missing) = tokio::join!(async { feedback(score) }, async {
            missing_keywords_with(&ocr.extracted_text, &model_answer.model_text, &self.config.keywords)
        });

        tracing::info!(
            "Evaluated {} against model answer {}: score {:.2} via {}, {} missing keywords",
            path.display(),
            model_answer.id,
            score,
            ocr.engine,
            missing.len()
        );

        Ok(EvaluationOutcome::assemble(ocr, score, message, missing))
    }

    /// Resolve the model answer, evaluate, and hand the record to `sink`.
    ///
    /// The sink is only called for successful evaluations.
    ///
    /// # Errors
    ///
    /// `EvalError::ModelAnswerNotFound` when `input.model_answer_id` is unknown,
    /// plus everything [`Evaluator::evaluate`] returns.
    pub async fn evaluate_input(
        &self,
        input: &EvaluationInput,
        store: &dyn ModelAnswerStore,
        sink: &dyn ResultSink,
    ) -> Result<EvaluationOutcome> {
        let model_answer = store
            .get_model_answer(input.model_answer_id)
            .await?
            .ok_or(EvalError::ModelAnswerNotFound {
                id: input.model_answer_id,
            })?;

        let outcome = self.evaluate(&input.document_path, &model_answer).await?;
        sink.save_evaluation(EvaluationRecord::new(input, outcome.clone())).await?;

        Ok(outcome)
    }

    /// Synchronous wrapper for [`Evaluator::evaluate`].
    ///
    /// Must not be called from inside an async runtime.
    pub fn evaluate_sync(
        &self,
        document_path: impl AsRef<Path>,
        model_answer: &ModelAnswer,
    ) -> Result<EvaluationOutcome> {
        GLOBAL_RUNTIME.block_on(self.evaluate(document_path, model_answer))
    }
}

#[cfg(feature = "embeddings")]
fn load_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(crate::embeddings::FastEmbedder::from_config(config)?))
}

#[cfg(not(feature = "embeddings"))]
fn load_embedder(_config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    Err(EvalError::MissingDependency(
        "embedding model support requires the `embeddings` feature".to_string(),
    ))
}
