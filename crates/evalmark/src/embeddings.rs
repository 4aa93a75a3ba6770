//! Sentence embeddings for semantic scoring.
//!
//! The scorer only depends on the [`Embedder`] trait. With the `embeddings`
//! feature, [`FastEmbedder`] provides a local ONNX model via fastembed-rs; the
//! default preset is the multilingual paraphrase MiniLM model, so answers in
//! different languages can be compared.
//!
//! # Example
//!
//! ```rust,ignore
//! use evalmark::core::config::EmbeddingConfig;
//! use evalmark::embeddings::{Embedder, FastEmbedder};
//!
//! let embedder = FastEmbedder::from_config(&EmbeddingConfig::default())?;
//! let vectors = embedder.embed(&["Plants make food", "Pflanzen stellen Nahrung her"])?;
//! assert_eq!(vectors[0].len(), 384);
//! ```

use crate::Result;

#[cfg(feature = "embeddings")]
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Turns texts into fixed-size vectors.
///
/// Implementations are shared as `Arc<dyn Embedder>` and called from blocking
/// worker threads, so inference may be CPU-heavy.
pub trait Embedder: Send + Sync {
    /// Embed every text, returning one vector per input in the same order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Short model identifier for logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Named embedding model configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingPreset {
    pub name: &'static str,
    #[cfg(feature = "embeddings")]
    pub model: EmbeddingModel,
    #[cfg(not(feature = "embeddings"))]
    pub model_name: &'static str,
    pub dimensions: usize,
    pub description: &'static str,
}

/// All available embedding presets.
pub const EMBEDDING_PRESETS: &[EmbeddingPreset] = &[
    EmbeddingPreset {
        name: "multilingual-mini",
        #[cfg(feature = "embeddings")]
        model: EmbeddingModel::ParaphraseMLMiniLML12V2,
        #[cfg(not(feature = "embeddings"))]
        model_name: "ParaphraseMLMiniLML12V2",
        dimensions: 384,
        description: "paraphrase-multilingual-MiniLM-L12-v2 (384 dims, 50+ languages). Default for answer grading.",
    },
    EmbeddingPreset {
        name: "multilingual-mini-q",
        #[cfg(feature = "embeddings")]
        model: EmbeddingModel::ParaphraseMLMiniLML12V2Q,
        #[cfg(not(feature = "embeddings"))]
        model_name: "ParaphraseMLMiniLML12V2Q",
        dimensions: 384,
        description: "Quantized paraphrase-multilingual-MiniLM-L12-v2. Smaller download, slightly lower accuracy.",
    },
    EmbeddingPreset {
        name: "multilingual",
        #[cfg(feature = "embeddings")]
        model: EmbeddingModel::MultilingualE5Base,
        #[cfg(not(feature = "embeddings"))]
        model_name: "MultilingualE5Base",
        dimensions: 768,
        description: "multilingual-e5-base (768 dims, 100+ languages). Higher quality, slower.",
    },
    EmbeddingPreset {
        name: "fast",
        #[cfg(feature = "embeddings")]
        model: EmbeddingModel::AllMiniLML6V2Q,
        #[cfg(not(feature = "embeddings"))]
        model_name: "AllMiniLML6V2Q",
        dimensions: 384,
        description: "Quantized all-MiniLM-L6-v2 (384 dims). English only.",
    },
];

/// Get a preset by name.
pub fn get_preset(name: &str) -> Option<&'static EmbeddingPreset> {
    EMBEDDING_PRESETS.iter().find(|p| p.name == name)
}

/// List all available preset names.
pub fn list_presets() -> Vec<&'static str> {
    EMBEDDING_PRESETS.iter().map(|p| p.name).collect()
}

/// Embedder backed by a local fastembed ONNX model.
///
/// fastembed inference needs `&mut self`; calls are serialized through a mutex.
#[cfg(feature = "embeddings")]
pub struct FastEmbedder {
    model: parking_lot::Mutex<TextEmbedding>,
    preset: &'static EmbeddingPreset,
    batch_size: usize,
}

#[cfg(feature = "embeddings")]
impl FastEmbedder {
    /// Load (downloading on first use) the model named by `config.model`.
    ///
    /// # Errors
    ///
    /// - `EvalError::Validation` - unknown preset
    /// - `EvalError::Plugin` - the model could not be loaded
    pub fn from_config(config: &crate::core::config::EmbeddingConfig) -> Result<Self> {
        let preset = get_preset(&config.model).ok_or_else(|| {
            crate::EvalError::validation(format!(
                "Unknown embedding preset: {}. Available: {}",
                config.model,
                list_presets().join(", ")
            ))
        })?;

        let cache_directory = config.cache_directory();
        tracing::debug!(
            "Loading embedding model '{}' from {}",
            preset.name,
            cache_directory.display()
        );

        let init_options = InitOptions::new(preset.model.clone())
            .with_cache_dir(cache_directory)
            .with_show_download_progress(config.show_download_progress);

        let model = TextEmbedding::try_new(init_options).map_err(|e| crate::EvalError::Plugin {
            message: format!("Failed to initialize embedding model: {}", e),
            plugin_name: "embeddings".to_string(),
        })?;

        Ok(Self {
            model: parking_lot::Mutex::new(model),
            preset,
            batch_size: config.batch_size,
        })
    }

    pub fn preset(&self) -> &'static EmbeddingPreset {
        self.preset
    }
}

#[cfg(feature = "embeddings")]
impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut model = self.model.lock();
        model
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| crate::EvalError::scoring(format!("Failed to generate embeddings: {}", e)))
    }

    fn model_name(&self) -> &str {
        self.preset.name
    }
}
