//! End-to-end chunking: configuration validation, tokenizer resolution,
//! structural splitting, text composition, and metadata annotation.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chunkmill_core::{ChunkConfig, ChunkRecord, ChunkmillError, ContentItem, Document, ItemKind};

use crate::metadata::extract_metadata;
use crate::splitter::{split_document, SplitOptions, ITEM_SEPARATOR};
use crate::table::{fallback_text, try_serialize_table};
use crate::tokenizer::TokenizerProvider;

/// Chunking engine. Cheap to clone per worker; the tokenizer provider is
/// the only shared state.
#[derive(Clone)]
pub struct ChunkingPipeline {
    provider: Arc<TokenizerProvider>,
}

#[derive(Default)]
struct TableCounters {
    serialized: usize,
    failed: usize,
}

impl ChunkingPipeline {
    pub fn new(provider: Arc<TokenizerProvider>) -> Self {
        Self { provider }
    }

    /// Chunk one document.
    ///
    /// An empty document yields an empty vec, not an error. Tokenizer
    /// problems degrade to the built-in counter; only an invalid
    /// configuration fails the call, and it fails before any work starts.
    pub fn run(
        &self,
        doc: &Document,
        config: &ChunkConfig,
    ) -> Result<Vec<ChunkRecord>, ChunkmillError> {
        config.validate()?;
        let started = Instant::now();

        let tokenizer = self.provider.get_tokenizer(config.model_identifier.as_deref());
        let options = SplitOptions {
            max_tokens: config.max_tokens,
            merge_peers: config.merge_peers,
            serialize_tables: config.serialize_tables,
        };
        let groups = split_document(doc, &tokenizer, &options);

        let mut counters = TableCounters::default();
        let mut records = Vec::with_capacity(groups.len());
        for (chunk_index, group) in groups.into_iter().enumerate() {
            let body = compose_body(&group.items, config.serialize_tables, &mut counters);
            let text = if config.text_prefix.is_empty() {
                body
            } else {
                format!("{}{}", config.text_prefix, body)
            };
            let metadata = extract_metadata(&group.items);
            let section_title = group.heading_path().last().cloned();
            let items = config.include_items.then_some(group.items);
            records.push(ChunkRecord {
                text,
                section_title,
                chunk_index,
                metadata,
                items,
            });
        }

        log_statistics(doc, &records, started.elapsed());
        if config.serialize_tables && counters.serialized + counters.failed > 0 {
            tracing::info!(
                serialized = counters.serialized,
                failed = counters.failed,
                "table serialization summary"
            );
        }
        Ok(records)
    }
}

/// Join item texts with blank lines, serializing tables when enabled.
/// Empty texts are skipped rather than producing stacked separators.
fn compose_body(
    items: &[ContentItem],
    serialize_tables: bool,
    counters: &mut TableCounters,
) -> String {
    let mut parts: Vec<Cow<'_, str>> = Vec::with_capacity(items.len());
    for item in items {
        let text: Cow<'_, str> = if serialize_tables && item.kind == ItemKind::Table {
            match try_serialize_table(item) {
                Some(text) => {
                    counters.serialized += 1;
                    Cow::Owned(text)
                }
                None => {
                    counters.failed += 1;
                    Cow::Owned(fallback_text(item))
                }
            }
        } else {
            Cow::Borrowed(item.text.as_str())
        };
        if !text.is_empty() {
            parts.push(text);
        }
    }
    parts.join(ITEM_SEPARATOR)
}

fn log_statistics(doc: &Document, records: &[ChunkRecord], elapsed: Duration) {
    let avg_chars = if records.is_empty() {
        0
    } else {
        records.iter().map(|r| r.text.len()).sum::<usize>() / records.len()
    };
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        records.len() as f64 / secs
    } else {
        0.0
    };
    tracing::info!(
        document = doc.name.as_deref().unwrap_or("(unnamed)"),
        chunks = records.len(),
        avg_chars,
        "chunking complete in {:.2?} ({:.1} chunks/sec)",
        elapsed,
        rate
    );
}
