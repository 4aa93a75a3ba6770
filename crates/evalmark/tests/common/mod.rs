//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use evalmark::embeddings::Embedder;
use evalmark::plugins::{OcrBackend, OcrOutput, Plugin};
use evalmark::{EngineId, EvalError, OcrConfig, Result};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PHOTOSYNTHESIS: &str = "Photosynthesis converts light energy into chemical energy stored in glucose";

/// Scripted OCR backend.
pub struct MockOcrBackend {
    engine: EngineId,
    output: std::result::Result<OcrOutput, String>,
    pub calls: AtomicUsize,
}

impl MockOcrBackend {
    pub fn returning(engine: EngineId, text: &str) -> Arc<Self> {
        Self::with_output(engine, OcrOutput::new(text))
    }

    pub fn with_output(engine: EngineId, output: OcrOutput) -> Arc<Self> {
        Arc::new(Self {
            engine,
            output: Ok(output),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(engine: EngineId, message: &str) -> Arc<Self> {
        Arc::new(Self {
            engine,
            output: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Plugin for MockOcrBackend {
    fn name(&self) -> &str {
        self.engine.as_str()
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl OcrBackend for MockOcrBackend {
    async fn process_file(&self, _path: &Path, _config: &OcrConfig) -> Result<OcrOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.clone().map_err(EvalError::ocr)
    }

    fn engine(&self) -> EngineId {
        self.engine.clone()
    }
}

/// Deterministic bag-of-words embedder.
///
/// Every lowercase alphabetic token increments one of 64 buckets, so identical
/// texts always embed identically and disjoint vocabularies rarely overlap.
pub struct HashingEmbedder;

impl HashingEmbedder {
    fn bucket(token: &str) -> usize {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        (hash % 64) as usize
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 64];
                for token in text
                    .to_lowercase()
                    .split(|c: char| !c.is_alphabetic())
                    .filter(|t| !t.is_empty())
                {
                    vector[Self::bucket(token)] += 1.0;
                }
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}

/// Returns two fixed vectors whose cosine similarity is `similarity`.
pub struct FixedSimilarityEmbedder {
    pub similarity: f32,
}

impl Embedder for FixedSimilarityEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let orthogonal = (1.0 - self.similarity * self.similarity).sqrt();
        let vectors = [vec![1.0, 0.0], vec![self.similarity, orthogonal]];
        Ok(vectors.into_iter().take(texts.len()).collect())
    }
}

/// Embedder that always fails, standing in for an unavailable model.
pub struct UnavailableEmbedder;

impl Embedder for UnavailableEmbedder {
    fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Err(EvalError::MissingDependency("embedding model not loaded".to_string()))
    }
}
