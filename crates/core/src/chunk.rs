use serde::{Deserialize, Serialize};

use crate::document::ContentItem;

/// Separator used to join heading ancestry into a breadcrumb string.
pub const HEADING_SEPARATOR: &str = " > ";

/// Defining kind of a chunk's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Table,
    List,
    Heading,
}

/// Descriptive metadata attached to every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub content_type: ContentType,
    /// Heading ancestry joined with [`HEADING_SEPARATOR`]; empty when the
    /// chunk has no heading context.
    pub heading_path: String,
    /// Sorted union of the constituent items' page numbers.
    pub pages: Vec<u32>,
    /// Number of content items folded into the chunk.
    pub doc_items_count: usize,
    /// Whether any constituent table carried a recoverable grid.
    pub has_table_structure: bool,
}

/// One unit of chunker output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Final text: optional caller prefix + item texts joined by blank lines.
    pub text: String,
    /// Most specific heading governing the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    /// Position in the output sequence, 0-based and gap-free.
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
    /// Constituent items verbatim, populated when full provenance is
    /// requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ContentItem>>,
}
