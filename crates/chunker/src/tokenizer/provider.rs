use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use once_cell::sync::OnceCell;

use chunkmill_core::config::TokenizerConfig;

use super::counter::WordCounter;
use super::loader::FileLoader;
use super::traits::{TokenCounter, TokenizerError, TokenizerLoader};

/// Longest accepted model identifier.
const MAX_IDENTIFIER_LEN: usize = 200;

/// Opaque, cheaply cloneable handle to a resolved tokenizer.
#[derive(Clone)]
pub struct TokenizerHandle {
    model: Option<Arc<str>>,
    counter: Arc<dyn TokenCounter>,
}

impl TokenizerHandle {
    pub(crate) fn builtin() -> Self {
        Self {
            model: None,
            counter: Arc::new(WordCounter),
        }
    }

    pub(crate) fn named(model: &str, counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            model: Some(Arc::from(model)),
            counter,
        }
    }

    /// Identifier this handle was resolved for; `None` for the built-in
    /// word counter.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.counter.count_tokens(text)
    }

    pub fn encode(&self, text: &str) -> Vec<String> {
        self.counter.encode(text)
    }
}

impl fmt::Debug for TokenizerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerHandle")
            .field("model", &self.model)
            .finish()
    }
}

/// Cache counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

type Slot = Arc<OnceCell<TokenizerHandle>>;

/// Process-wide tokenizer registry: a bounded LRU of constructed handles
/// with single-flight construction per identifier.
///
/// The map lock is held only for slot lookup and insertion; construction
/// runs outside it, so a slow load blocks callers of the same identifier
/// and nobody else. Eviction happens under the same lock as insertion.
/// Construction failures warn, fall back to the built-in counter, and are
/// never cached, so a later call retries.
pub struct TokenizerProvider {
    loader: Arc<dyn TokenizerLoader>,
    slots: Mutex<LruCache<String, Slot>>,
    builtin: TokenizerHandle,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TokenizerProvider {
    /// Provider with the default filesystem loader.
    pub fn new(config: &TokenizerConfig) -> Self {
        Self::with_loader(
            Arc::new(FileLoader::new(config.tokenizer_dir.clone())),
            config.cache_capacity,
        )
    }

    /// Provider with a custom loader (tests, alternative resolution).
    pub fn with_loader(loader: Arc<dyn TokenizerLoader>, capacity: usize) -> Self {
        Self {
            loader,
            slots: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap()),
            )),
            builtin: TokenizerHandle::builtin(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Resolve a handle for `model`. `None` selects the built-in counter
    /// without touching the cache; an invalid identifier or failed
    /// construction logs a warning and also yields the built-in counter.
    pub fn get_tokenizer(&self, model: Option<&str>) -> TokenizerHandle {
        let Some(raw) = model else {
            return self.builtin.clone();
        };
        let key = match validate_identifier(raw) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(model = raw, error = %err, "invalid tokenizer identifier, using built-in counter");
                return self.builtin.clone();
            }
        };

        let slot = {
            let mut slots = self.slots.lock().expect("tokenizer cache lock poisoned");
            match slots.get(key) {
                Some(slot) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    slot.clone()
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let slot: Slot = Arc::new(OnceCell::new());
                    slots.put(key.to_string(), slot.clone());
                    slot
                }
            }
        };

        match slot.get_or_try_init(|| {
            self.loader
                .load(key)
                .map(|counter| TokenizerHandle::named(key, counter))
        }) {
            Ok(handle) => handle.clone(),
            Err(err) => {
                tracing::warn!(model = key, error = %err, "tokenizer construction failed, using built-in counter");
                self.drop_failed_slot(key, &slot);
                self.builtin.clone()
            }
        }
    }

    /// Count tokens with the tokenizer selected by `model`.
    pub fn count_tokens(&self, text: &str, model: Option<&str>) -> usize {
        self.get_tokenizer(model).count_tokens(text)
    }

    pub fn cache_stats(&self) -> CacheStats {
        let slots = self.slots.lock().expect("tokenizer cache lock poisoned");
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: slots.len(),
            capacity: slots.cap().get(),
        }
    }

    /// Drop every cached handle. Mainly for tests and long-lived processes
    /// switching corpora.
    pub fn clear_cache(&self) {
        self.slots
            .lock()
            .expect("tokenizer cache lock poisoned")
            .clear();
    }

    /// Remove a slot whose construction failed, unless another caller
    /// already replaced or filled it.
    fn drop_failed_slot(&self, key: &str, slot: &Slot) {
        let mut slots = self.slots.lock().expect("tokenizer cache lock poisoned");
        let stale = slots
            .peek(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if stale {
            slots.pop(key);
        }
    }
}

impl Default for TokenizerProvider {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}

/// Normalize and validate a model identifier: trimmed, non-empty, bounded
/// length. Repo-style ids may not start or end with a slash; identifiers
/// naming a `.json` file directly are exempt so absolute paths stay usable.
pub(crate) fn validate_identifier(raw: &str) -> Result<&str, TokenizerError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(TokenizerError::InvalidIdentifier(
            "empty identifier".to_string(),
        ));
    }
    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(TokenizerError::InvalidIdentifier(format!(
            "identifier exceeds {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    if !id.ends_with(".json") && (id.starts_with('/') || id.ends_with('/')) {
        return Err(TokenizerError::InvalidIdentifier(format!(
            "identifier has a leading or trailing slash: '{id}'"
        )));
    }
    Ok(id)
}
