use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

use super::traits::{TokenCounter, TokenizerError};

/// Unicode word counter used when no model tokenizer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.unicode_words().count()
    }

    fn encode(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }
}

/// Counter backed by a HuggingFace `tokenizer.json` vocabulary.
pub struct HuggingFaceCounter {
    tokenizer: tokenizers::Tokenizer,
}

impl HuggingFaceCounter {
    /// Load a vocabulary from disk.
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let tokenizer =
            tokenizers::Tokenizer::from_file(path).map_err(|e| TokenizerError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self { tokenizer })
    }
}

impl TokenCounter for HuggingFaceCounter {
    /// Counts without special markers. A failed encode falls back to word
    /// counting so budgeting never panics.
    fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer
            .encode(text, false)
            .map(|encoding| encoding.len())
            .unwrap_or_else(|_| WordCounter.count_tokens(text))
    }

    fn encode(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .encode(text, false)
            .map(|encoding| encoding.get_tokens().to_vec())
            .unwrap_or_default()
    }
}
