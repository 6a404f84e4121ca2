//! Structural chunking: greedy token-budget packing with heading-aware
//! boundaries and a peer-merge pass.

use std::borrow::Cow;

use chunkmill_core::{ContentItem, Document, ItemKind};

use crate::table::serialize_table;
use crate::tokenizer::TokenizerHandle;

/// Separator between item texts inside one chunk.
pub const ITEM_SEPARATOR: &str = "\n\n";

/// Options consumed by the structural pass.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Token budget per chunk.
    pub max_tokens: usize,
    /// Fold adjacent same-path groups back together while under budget.
    pub merge_peers: bool,
    /// Budget tables by their key-value serialization instead of raw text.
    pub serialize_tables: bool,
}

/// A contiguous run of items sharing one heading path, before metadata
/// and index assignment.
#[derive(Debug, Clone)]
pub struct ChunkGroup {
    /// Constituent items, pristine clones in document order.
    pub items: Vec<ContentItem>,
    /// Body token count (item texts plus separators).
    pub token_count: usize,
}

impl ChunkGroup {
    /// Heading path shared by the group's items.
    pub fn heading_path(&self) -> &[String] {
        self.items
            .first()
            .map(|item| item.heading_path.as_slice())
            .unwrap_or(&[])
    }
}

/// Text an item contributes to its chunk: tables serialize to key-value
/// lines when enabled, everything else contributes its own text.
pub fn effective_text(item: &ContentItem, serialize_tables: bool) -> Cow<'_, str> {
    if serialize_tables && item.kind == ItemKind::Table {
        Cow::Owned(serialize_table(item))
    } else {
        Cow::Borrowed(item.text.as_str())
    }
}

/// Split a document into chunk groups.
///
/// Greedy first pass: accumulate items in order, closing the running group
/// when the heading path changes or adding the item would exceed the
/// budget. A single over-budget item becomes a standalone group; items are
/// never split. The optional second pass merges adjacent same-path groups
/// whose combined body fits the budget.
pub fn split_document(
    doc: &Document,
    tokenizer: &TokenizerHandle,
    options: &SplitOptions,
) -> Vec<ChunkGroup> {
    let separator_tokens = tokenizer.count_tokens(ITEM_SEPARATOR);

    let mut groups: Vec<ChunkGroup> = Vec::new();
    let mut run: Vec<ContentItem> = Vec::new();
    let mut run_tokens = 0usize;

    for item in &doc.items {
        let text = effective_text(item, options.serialize_tables);
        let item_tokens = tokenizer.count_tokens(&text);

        if !run.is_empty() {
            let path_changed = item.heading_path != run[0].heading_path;
            let over_budget = run_tokens + separator_tokens + item_tokens > options.max_tokens;
            if path_changed || over_budget {
                groups.push(ChunkGroup {
                    items: std::mem::take(&mut run),
                    token_count: run_tokens,
                });
                run_tokens = 0;
            }
        }

        run_tokens += if run.is_empty() {
            item_tokens
        } else {
            separator_tokens + item_tokens
        };
        run.push(item.clone());
    }
    if !run.is_empty() {
        groups.push(ChunkGroup {
            items: run,
            token_count: run_tokens,
        });
    }

    let groups = if options.merge_peers {
        merge_peers(groups, options.max_tokens, separator_tokens)
    } else {
        groups
    };

    tracing::debug!(
        document = doc.name.as_deref().unwrap_or("(unnamed)"),
        items = doc.items.len(),
        groups = groups.len(),
        "split document"
    );
    groups
}

/// Fold adjacent groups sharing a heading path while the combined body
/// stays under budget. Merging is associative, so one left-to-right pass
/// can never leave new work behind.
fn merge_peers(
    groups: Vec<ChunkGroup>,
    max_tokens: usize,
    separator_tokens: usize,
) -> Vec<ChunkGroup> {
    let mut merged: Vec<ChunkGroup> = Vec::with_capacity(groups.len());
    for group in groups {
        if let Some(last) = merged.last_mut() {
            let combined = last.token_count + separator_tokens + group.token_count;
            if last.heading_path() == group.heading_path() && combined <= max_tokens {
                last.items.extend(group.items);
                last.token_count = combined;
                continue;
            }
        }
        merged.push(group);
    }
    merged
}
