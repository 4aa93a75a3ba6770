//! Persistence boundaries of the evaluator.
//!
//! The evaluator reads model answers through [`ModelAnswerStore`] and hands
//! finished evaluations to a [`ResultSink`]. Database-backed services implement
//! these traits; [`InMemoryStore`] covers tests and the CLI.

use crate::types::{EvaluationRecord, ModelAnswer};
use crate::{EvalError, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::Path;

/// Lookup of reference answers by id.
#[async_trait]
pub trait ModelAnswerStore: Send + Sync {
    /// Fetch a model answer. `Ok(None)` means the id does not exist.
    async fn get_model_answer(&self, id: i64) -> Result<Option<ModelAnswer>>;
}

/// Receiver of completed evaluations.
///
/// Called exactly once per successful evaluation and never for a failed one.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn save_evaluation(&self, record: EvaluationRecord) -> Result<()>;
}

/// Thread-safe in-memory store implementing both boundaries.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    answers: RwLock<HashMap<i64, ModelAnswer>>,
    records: Mutex<Vec<EvaluationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from model answers, rejecting invalid or duplicate entries.
    pub fn with_answers(answers: impl IntoIterator<Item = ModelAnswer>) -> Result<Self> {
        let store = Self::new();
        for answer in answers {
            store.insert(answer)?;
        }
        Ok(store)
    }

    /// Load model answers from a JSON array file.
    ///
    /// ```json
    /// [{"id": 1, "question_title": "Photosynthesis", "model_text": "..."}]
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let answers: Vec<ModelAnswer> = serde_json::from_str(&content).map_err(|e| {
            EvalError::serialization_with_source(format!("Invalid model answers in {}", path.display()), e)
        })?;

        tracing::debug!("Loaded {} model answers from {}", answers.len(), path.display());
        Self::with_answers(answers)
    }

    /// Add a model answer. Ids must be unique.
    pub fn insert(&self, answer: ModelAnswer) -> Result<()> {
        answer.validate()?;

        let mut answers = self.answers.write();
        if answers.contains_key(&answer.id) {
            return Err(EvalError::validation(format!("Duplicate model answer id {}", answer.id)));
        }
        answers.insert(answer.id, answer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.answers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.read().is_empty()
    }

    /// Snapshot of the evaluations saved so far, oldest first.
    pub fn records(&self) -> Vec<EvaluationRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl ModelAnswerStore for InMemoryStore {
    async fn get_model_answer(&self, id: i64) -> Result<Option<ModelAnswer>> {
        Ok(self.answers.read().get(&id).cloned())
    }
}

#[async_trait]
impl ResultSink for InMemoryStore {
    async fn save_evaluation(&self, record: EvaluationRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }
}
