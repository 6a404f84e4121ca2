use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ChunkmillError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

/// Default token budget per chunk.
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Smallest budget accepted from the environment; lower values clamp up.
pub const MIN_MAX_TOKENS: usize = 16;

/// Default capacity of the process-wide tokenizer cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

// ── Chunking ──────────────────────────────────────────────────

/// Per-run chunking options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Token budget per chunk. A single item over budget becomes a
    /// standalone chunk; it is never split.
    pub max_tokens: usize,
    /// Second pass that merges adjacent chunks sharing a heading path
    /// while the combined size stays under budget.
    pub merge_peers: bool,
    /// Tokenizer model identifier; `None` selects the built-in word
    /// counter.
    pub model_identifier: Option<String>,
    /// Replace each table item's text with its key-value serialization.
    pub serialize_tables: bool,
    /// Verbatim prefix prepended to every chunk's text.
    pub text_prefix: String,
    /// Carry the constituent items on each output record.
    pub include_items: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            merge_peers: true,
            model_identifier: None,
            serialize_tables: false,
            text_prefix: String::new(),
            include_items: false,
        }
    }
}

impl ChunkConfig {
    /// Reject configurations the pipeline cannot honor. Runs before any
    /// document work, so a bad config never yields partial output.
    pub fn validate(&self) -> Result<(), ChunkmillError> {
        if self.max_tokens == 0 {
            return Err(ChunkmillError::Config(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn from_env() -> Self {
        let mut max_tokens = env_usize("CHUNKMILL_MAX_TOKENS", DEFAULT_MAX_TOKENS);
        if max_tokens < MIN_MAX_TOKENS {
            tracing::warn!(
                max_tokens,
                minimum = MIN_MAX_TOKENS,
                "CHUNKMILL_MAX_TOKENS below minimum, clamping"
            );
            max_tokens = MIN_MAX_TOKENS;
        }
        Self {
            max_tokens,
            merge_peers: env_bool("CHUNKMILL_MERGE_PEERS", true),
            model_identifier: env_opt("CHUNKMILL_TOKENIZER_MODEL"),
            serialize_tables: env_bool("CHUNKMILL_SERIALIZE_TABLES", false),
            text_prefix: env_or("CHUNKMILL_TEXT_PREFIX", ""),
            include_items: env_bool("CHUNKMILL_INCLUDE_ITEMS", false),
        }
    }
}

// ── Tokenizer ─────────────────────────────────────────────────

/// Tokenizer resolution and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Directory holding `<model id>/tokenizer.json` vocabularies.
    pub tokenizer_dir: PathBuf,
    /// LRU capacity of the process-wide tokenizer cache.
    pub cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            tokenizer_dir: PathBuf::from("models/tokenizers"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl TokenizerConfig {
    fn from_env() -> Self {
        Self {
            tokenizer_dir: PathBuf::from(env_or("CHUNKMILL_TOKENIZER_DIR", "models/tokenizers")),
            cache_capacity: env_usize("CHUNKMILL_TOKENIZER_CACHE", DEFAULT_CACHE_CAPACITY).max(1),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chunking: ChunkConfig,
    pub tokenizer: TokenizerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            chunking: ChunkConfig::from_env(),
            tokenizer: TokenizerConfig::from_env(),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  chunking:   max_tokens={}, merge_peers={}, serialize_tables={}",
            self.chunking.max_tokens,
            self.chunking.merge_peers,
            self.chunking.serialize_tables
        );
        tracing::info!(
            "  tokenizer:  model={}, dir={}, cache_capacity={}",
            self.chunking.model_identifier.as_deref().unwrap_or("(built-in)"),
            self.tokenizer.tokenizer_dir.display(),
            self.tokenizer.cache_capacity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ChunkConfig::default();
        assert_eq!(config.max_tokens, 512);
        assert!(config.merge_peers);
        assert!(config.model_identifier.is_none());
        assert!(!config.serialize_tables);
        assert_eq!(config.text_prefix, "");
        assert!(!config.include_items);
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let config = ChunkConfig {
            max_tokens: 0,
            ..ChunkConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ChunkmillError::Config(_)));
    }

    #[test]
    fn tiny_max_tokens_is_accepted_programmatically() {
        let config = ChunkConfig {
            max_tokens: 1,
            ..ChunkConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    // Env keys are process-global, so the env round-trip lives in a single
    // test to keep parallel test runs from racing on them.
    #[test]
    fn env_overrides_and_clamping() {
        env::set_var("CHUNKMILL_MAX_TOKENS", "5");
        env::set_var("CHUNKMILL_MERGE_PEERS", "false");
        env::set_var("CHUNKMILL_TEXT_PREFIX", "doc: ");
        let config = Config::from_env();
        assert_eq!(config.chunking.max_tokens, MIN_MAX_TOKENS);
        assert!(!config.chunking.merge_peers);
        assert_eq!(config.chunking.text_prefix, "doc: ");

        env::set_var("CHUNKMILL_MAX_TOKENS", "256");
        let config = Config::from_env();
        assert_eq!(config.chunking.max_tokens, 256);

        env::remove_var("CHUNKMILL_MAX_TOKENS");
        env::remove_var("CHUNKMILL_MERGE_PEERS");
        env::remove_var("CHUNKMILL_TEXT_PREFIX");
        let config = Config::from_env();
        assert_eq!(config.chunking.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.chunking.merge_peers);
    }
}
