//! Grid recovery from whatever table representation the producer supplied.

use chunkmill_core::TableData;

/// Dense rows of cell text, header row first.
pub type Grid = Vec<Vec<String>>;

/// Ordered extraction chain. Each stage is a pure function returning a
/// grid, or `None` when its representation is absent or unusable; the
/// first success wins.
const EXTRACTORS: &[fn(&TableData) -> Option<Grid>] =
    &[from_dense_grid, from_markdown, from_sparse_cells];

/// Recover a dense grid from `data`. A `Some` result always holds at
/// least one row.
pub fn extract_grid(data: &TableData) -> Option<Grid> {
    EXTRACTORS.iter().find_map(|extract| extract(data))
}

fn from_dense_grid(data: &TableData) -> Option<Grid> {
    if data.grid.is_empty() {
        return None;
    }
    Some(
        data.grid
            .iter()
            .map(|row| row.iter().map(|cell| cell.text.clone()).collect())
            .collect(),
    )
}

/// Parse a pipe table: keep lines holding at least two pipes, drop
/// separator lines (only `|`, `-`, `:`, spaces), split on `|`, trim cells.
fn from_markdown(data: &TableData) -> Option<Grid> {
    let markdown = data.markdown.as_deref()?;
    let mut rows: Grid = Vec::new();
    for line in markdown.lines() {
        let line = line.trim();
        if line.matches('|').count() < 2 {
            continue;
        }
        if line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' ')) {
            continue;
        }
        let cells = line
            .trim_matches('|')
            .split('|')
            .map(|cell| cell.trim().to_string())
            .collect();
        rows.push(cells);
    }
    (!rows.is_empty()).then_some(rows)
}

/// Upper bound on `rows * cols` for a grid rebuilt from sparse cells.
/// The dense allocation is sized by the largest coordinate seen, not by
/// the cell count, so a stray coordinate must not be allowed to pick
/// the size.
const MAX_GRID_CELLS: usize = 1_000_000;

/// Rebuild a dense grid from coordinate-addressed cells; gaps become
/// empty strings. Returns `None` when the coordinates imply more than
/// [`MAX_GRID_CELLS`] cells, leaving the caller to degrade.
fn from_sparse_cells(data: &TableData) -> Option<Grid> {
    if data.cells.is_empty() {
        return None;
    }
    let mut rows: usize = 0;
    let mut cols: usize = 0;
    for cell in &data.cells {
        rows = rows.max(cell.row.checked_add(1)?);
        cols = cols.max(cell.col.checked_add(1)?);
    }
    if rows.checked_mul(cols)? > MAX_GRID_CELLS {
        tracing::debug!(rows, cols, "sparse cell coordinates exceed grid bound");
        return None;
    }
    let mut grid = vec![vec![String::new(); cols]; rows];
    for cell in &data.cells {
        grid[cell.row][cell.col] = cell.text.clone();
    }
    Some(grid)
}
