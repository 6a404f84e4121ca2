//! Tokenizer resolution, counting, and caching.
//!
//! `TokenizerProvider` hands out cheap `TokenizerHandle`s: the built-in
//! Unicode word counter when no model is configured, HuggingFace
//! `tokenizer.json` vocabularies otherwise. Constructed handles live in a
//! bounded LRU keyed by model identifier; construction is single-flight per
//! key, and failures fall back to the built-in counter with a warning
//! instead of surfacing to the caller.

mod counter;
mod loader;
mod provider;
mod traits;

pub use counter::{HuggingFaceCounter, WordCounter};
pub use loader::FileLoader;
pub use provider::{CacheStats, TokenizerHandle, TokenizerProvider};
pub use traits::{TokenCounter, TokenizerError, TokenizerLoader};

#[cfg(test)]
mod tests;
