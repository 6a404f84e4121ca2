//! Tests for tokenizer resolution, caching, and fallback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::provider::{validate_identifier, TokenizerProvider};
use super::traits::{TokenCounter, TokenizerError, TokenizerLoader};

/// Counter that reports a fixed token count, to tell loaded handles apart
/// from the built-in word counter.
struct FixedCounter(usize);

impl TokenCounter for FixedCounter {
    fn count_tokens(&self, _text: &str) -> usize {
        self.0
    }

    fn encode(&self, _text: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Loader that fabricates `FixedCounter`s and records every call.
struct FakeLoader {
    calls: AtomicUsize,
    fail_for: Option<String>,
    delay: Option<Duration>,
    fixed_count: usize,
}

impl FakeLoader {
    fn new(fixed_count: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_for: None,
            delay: None,
            fixed_count,
        }
    }

    fn failing_for(model: &str) -> Self {
        Self {
            fail_for: Some(model.to_string()),
            ..Self::new(1)
        }
    }

    fn slow(fixed_count: usize, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(fixed_count)
        }
    }
}

impl TokenizerLoader for FakeLoader {
    fn load(&self, model: &str) -> Result<Arc<dyn TokenCounter>, TokenizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if self.fail_for.as_deref() == Some(model) {
            return Err(TokenizerError::NotFound {
                model: model.to_string(),
                dir: "fake".into(),
            });
        }
        Ok(Arc::new(FixedCounter(self.fixed_count)))
    }
}

fn provider_with(loader: Arc<FakeLoader>, capacity: usize) -> TokenizerProvider {
    TokenizerProvider::with_loader(loader, capacity)
}

// ── Resolution and fallback ─────────────────────────────────────────

#[test]
fn none_selects_the_builtin_word_counter() {
    let loader = Arc::new(FakeLoader::new(99));
    let provider = provider_with(loader.clone(), 4);

    let handle = provider.get_tokenizer(None);
    assert_eq!(handle.model(), None);
    assert_eq!(handle.count_tokens("one two three"), 3);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn named_model_uses_the_loader() {
    let loader = Arc::new(FakeLoader::new(42));
    let provider = provider_with(loader.clone(), 4);

    let handle = provider.get_tokenizer(Some("acme/base"));
    assert_eq!(handle.model(), Some("acme/base"));
    assert_eq!(handle.count_tokens("anything at all"), 42);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn identifier_is_trimmed_before_lookup() {
    let loader = Arc::new(FakeLoader::new(7));
    let provider = provider_with(loader.clone(), 4);

    provider.get_tokenizer(Some("  acme/base  "));
    provider.get_tokenizer(Some("acme/base"));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1, "same key after trim");
}

#[test]
fn construction_failure_falls_back_and_is_not_cached() {
    let loader = Arc::new(FakeLoader::failing_for("bad/model"));
    let provider = provider_with(loader.clone(), 4);

    let handle = provider.get_tokenizer(Some("bad/model"));
    assert_eq!(handle.model(), None, "fallback is the built-in counter");
    assert_eq!(handle.count_tokens("one two three"), 3);

    // A second request retries construction instead of caching the failure.
    provider.get_tokenizer(Some("bad/model"));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    assert_eq!(provider.cache_stats().len, 0);
}

#[test]
fn invalid_identifier_falls_back_without_touching_the_loader() {
    let loader = Arc::new(FakeLoader::new(7));
    let provider = provider_with(loader.clone(), 4);

    for bad in ["", "   ", "/leading", "trailing/"] {
        let handle = provider.get_tokenizer(Some(bad));
        assert_eq!(handle.model(), None, "{bad:?} should fall back");
    }
    assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
}

// ── Caching ─────────────────────────────────────────────────────────

#[test]
fn repeated_requests_hit_the_cache() {
    let loader = Arc::new(FakeLoader::new(7));
    let provider = provider_with(loader.clone(), 4);

    provider.get_tokenizer(Some("acme/base"));
    provider.get_tokenizer(Some("acme/base"));
    provider.get_tokenizer(Some("acme/base"));

    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    let stats = provider.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.len, 1);
}

#[test]
fn eviction_follows_lru_order() {
    let loader = Arc::new(FakeLoader::new(7));
    let provider = provider_with(loader.clone(), 2);

    provider.get_tokenizer(Some("a"));
    provider.get_tokenizer(Some("b"));
    provider.get_tokenizer(Some("a")); // refresh "a", making "b" least recent
    provider.get_tokenizer(Some("c")); // evicts "b"
    assert_eq!(loader.calls.load(Ordering::SeqCst), 3);

    provider.get_tokenizer(Some("a")); // still resident
    assert_eq!(loader.calls.load(Ordering::SeqCst), 3);

    provider.get_tokenizer(Some("b")); // evicted, reconstructs
    assert_eq!(loader.calls.load(Ordering::SeqCst), 4);

    assert!(provider.cache_stats().len <= 2);
}

#[test]
fn clear_cache_forces_reconstruction() {
    let loader = Arc::new(FakeLoader::new(7));
    let provider = provider_with(loader.clone(), 4);

    provider.get_tokenizer(Some("acme/base"));
    provider.clear_cache();
    assert_eq!(provider.cache_stats().len, 0);

    provider.get_tokenizer(Some("acme/base"));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn count_tokens_convenience_resolves_and_counts() {
    let loader = Arc::new(FakeLoader::new(42));
    let provider = provider_with(loader, 4);

    assert_eq!(provider.count_tokens("whatever", Some("acme/base")), 42);
    assert_eq!(provider.count_tokens("one two", None), 2);
}

// ── Concurrency ─────────────────────────────────────────────────────

#[test]
fn concurrent_requests_construct_once() {
    let loader = Arc::new(FakeLoader::slow(42, Duration::from_millis(50)));
    let provider = Arc::new(provider_with(loader.clone(), 4));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            thread::spawn(move || provider.get_tokenizer(Some("acme/slow")).count_tokens("x"))
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), 42);
    }
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1, "single-flight");
}

// ── Identifier validation ───────────────────────────────────────────

#[test]
fn validation_accepts_and_trims_repo_ids() {
    assert_eq!(validate_identifier(" acme/base ").unwrap(), "acme/base");
    assert_eq!(validate_identifier("bert-base-cased").unwrap(), "bert-base-cased");
}

#[test]
fn validation_allows_direct_json_paths() {
    assert!(validate_identifier("/models/acme/tokenizer.json").is_ok());
}

#[test]
fn validation_rejects_malformed_ids() {
    assert!(validate_identifier("").is_err());
    assert!(validate_identifier("   ").is_err());
    assert!(validate_identifier("/acme/base").is_err());
    assert!(validate_identifier("acme/base/").is_err());
    assert!(validate_identifier(&"x".repeat(201)).is_err());
}
