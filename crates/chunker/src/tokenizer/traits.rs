use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Invalid model identifier: {0}")]
    InvalidIdentifier(String),

    #[error("No tokenizer files for '{model}' under {}", dir.display())]
    NotFound { model: String, dir: PathBuf },

    #[error("Failed to load tokenizer from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
}

/// Counts tokens for chunk budgeting. Implementations are read-only and
/// safe to share across threads.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count_tokens(&self, text: &str) -> usize;

    /// Token strings for `text`. Mainly for debugging and tests.
    fn encode(&self, text: &str) -> Vec<String>;
}

/// Constructs counters for validated model identifiers. Seam for swapping
/// resolution strategies in tests.
pub trait TokenizerLoader: Send + Sync {
    fn load(&self, model: &str) -> Result<Arc<dyn TokenCounter>, TokenizerError>;
}
