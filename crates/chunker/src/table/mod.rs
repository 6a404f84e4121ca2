//! Key-value table serialization.
//!
//! Renders recovered grids as one line per data row
//! (`Header1: Value1, Header2: Value2`), prefixed with a `Table: <caption>`
//! line when a caption is present. The first extracted row is treated as
//! the header row; producers that flag header rows put them first, so the
//! assumption holds for flagged and unflagged tables alike.

mod grid;

pub use grid::{extract_grid, Grid};

use chunkmill_core::ContentItem;

/// Serialize a table item when a grid is recoverable. `None` means the
/// caller should degrade via [`fallback_text`].
pub fn try_serialize_table(item: &ContentItem) -> Option<String> {
    let data = item.table.as_ref()?;
    extract_grid(data).map(|grid| format_key_value(&grid, data.caption.as_deref()))
}

/// Serialize a table item to key-value text. Never fails: when no grid can
/// be recovered the item degrades to its raw text, then to the caption
/// line, then to an empty string.
pub fn serialize_table(item: &ContentItem) -> String {
    try_serialize_table(item).unwrap_or_else(|| fallback_text(item))
}

/// Degraded rendering for a table whose structure could not be recovered.
pub(crate) fn fallback_text(item: &ContentItem) -> String {
    if !item.text.trim().is_empty() {
        return item.text.clone();
    }
    item.table
        .as_ref()
        .and_then(|data| data.caption.as_deref())
        .map(str::trim)
        .filter(|caption| !caption.is_empty())
        .map(caption_line)
        .unwrap_or_default()
}

/// Render a grid, first row as headers. Pairs with an empty header or an
/// empty value are skipped; rows with no surviving pairs emit no line.
fn format_key_value(grid: &Grid, caption: Option<&str>) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(grid.len());
    if let Some(caption) = caption.map(str::trim).filter(|c| !c.is_empty()) {
        lines.push(caption_line(caption));
    }
    if let Some((headers, rows)) = grid.split_first() {
        for row in rows {
            let pairs: Vec<String> = headers
                .iter()
                .zip(row)
                .filter_map(|(header, value)| {
                    let header = header.trim();
                    let value = value.trim();
                    (!header.is_empty() && !value.is_empty())
                        .then(|| format!("{header}: {value}"))
                })
                .collect();
            if !pairs.is_empty() {
                lines.push(pairs.join(", "));
            }
        }
    }
    lines.join("\n")
}

fn caption_line(caption: &str) -> String {
    format!("Table: {caption}")
}
