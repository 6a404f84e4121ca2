use serde::{Deserialize, Serialize};

/// Kind of a content item. Closed set — an unknown kind is a producer bug,
/// not something consumers route around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Heading,
    Paragraph,
    ListItem,
    Table,
    Picture,
}

/// One cell of a dense table grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    /// Cell belongs to a column-header row.
    #[serde(default)]
    pub column_header: bool,
    /// Cell belongs to a row-header column.
    #[serde(default)]
    pub row_header: bool,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            column_header: false,
            row_header: false,
        }
    }
}

impl From<&str> for TableCell {
    fn from(text: &str) -> Self {
        TableCell::new(text)
    }
}

/// A table cell addressed by explicit coordinates, for producers that emit
/// sparse cell lists instead of dense rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseCell {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

/// Structured payload of a table item. Producers fill whichever
/// representations they have; consumers try them in a fixed order
/// (dense grid, then markdown, then sparse cells).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Dense row-major grid. Empty when the producer only had markdown
    /// or sparse cells.
    #[serde(default)]
    pub grid: Vec<Vec<TableCell>>,
    /// Markdown pipe-table rendering, if the producer emitted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Sparse cells with explicit coordinates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<SparseCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// One flattened unit of document content.
///
/// Producer contract for `heading_path`: a heading item carries its own
/// title as the last element — a heading governs the section it opens, so
/// every item of one leaf section (the heading included) shares an
/// identical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ItemKind,
    /// Item text. Caption or alt text for pictures; may be empty.
    #[serde(default)]
    pub text: String,
    /// 1-based page numbers the item spans, ascending. Usually one.
    #[serde(default)]
    pub page_numbers: Vec<u32>,
    /// Headings governing this item, root first.
    #[serde(default)]
    pub heading_path: Vec<String>,
    /// Structured table payload, present only when `kind` is `Table`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableData>,
}

impl ContentItem {
    /// Plain item without provenance or table payload.
    pub fn new(kind: ItemKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            page_numbers: Vec::new(),
            heading_path: Vec::new(),
            table: None,
        }
    }
}

/// A parsed document, flattened to reading order (depth-first) by the
/// producer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Source name for logs, e.g. the original filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}
