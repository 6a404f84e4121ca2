//! Chunk metadata derivation.

use std::collections::BTreeSet;

use chunkmill_core::{ChunkMetadata, ContentItem, ContentType, ItemKind, HEADING_SEPARATOR};

use crate::table::extract_grid;

/// Derive metadata for one chunk's items. Pure; the order and content of
/// `items` fully determine the result.
pub fn extract_metadata(items: &[ContentItem]) -> ChunkMetadata {
    ChunkMetadata {
        content_type: content_type(items),
        heading_path: heading_breadcrumb(items),
        pages: page_union(items),
        doc_items_count: items.len(),
        has_table_structure: has_table_structure(items),
    }
}

/// Defining kind: tables dominate, then lists; a chunk of nothing but
/// headings is a heading chunk; everything else is text.
fn content_type(items: &[ContentItem]) -> ContentType {
    if items.iter().any(|item| item.kind == ItemKind::Table) {
        return ContentType::Table;
    }
    if items.iter().any(|item| item.kind == ItemKind::ListItem) {
        return ContentType::List;
    }
    if !items.is_empty() && items.iter().all(|item| item.kind == ItemKind::Heading) {
        return ContentType::Heading;
    }
    ContentType::Text
}

/// Breadcrumb of the governing heading path, taken from the first item
/// (groups are heading-homogeneous by construction).
fn heading_breadcrumb(items: &[ContentItem]) -> String {
    items
        .first()
        .map(|item| item.heading_path.join(HEADING_SEPARATOR))
        .unwrap_or_default()
}

/// Sorted, deduplicated union of page numbers across items.
fn page_union(items: &[ContentItem]) -> Vec<u32> {
    let pages: BTreeSet<u32> = items
        .iter()
        .flat_map(|item| item.page_numbers.iter().copied())
        .collect();
    pages.into_iter().collect()
}

/// True when some table item carries a recoverable grid. Uses the same
/// extraction chain as the serializer, so the two never disagree.
fn has_table_structure(items: &[ContentItem]) -> bool {
    items.iter().any(|item| {
        item.kind == ItemKind::Table && item.table.as_ref().and_then(extract_grid).is_some()
    })
}
