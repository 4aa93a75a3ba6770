//! Configuration for keyword extraction.

use serde::{Deserialize, Serialize};

/// Keyword extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Maximum number of keywords kept from the model answer (default: 10).
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Minimum token length in characters (default: 4).
    ///
    /// Longer words are used as a proxy for salient, technical terms.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

fn default_max_keywords() -> usize {
    10
}

fn default_min_length() -> usize {
    4
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            max_keywords: default_max_keywords(),
            min_length: default_min_length(),
        }
    }
}

impl KeywordConfig {
    pub fn with_max_keywords(mut self, max: usize) -> Self {
        self.max_keywords = max;
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }
}
