//! Reconstruction of a rectangular grid from a table with spanning cells
//!
//! Table nodes list their rows, and each row lists only the cells that start
//! in it. A cell spanning several rows therefore shifts the cells of the
//! rows below it to the right. [`normalize`] works out where every source
//! cell really starts and how far it extends.

use crate::rich_text::{Node, Span};
use std::collections::BTreeMap;

/// Word cannot lay out tables wider than this
pub const MAX_COLUMNS: usize = 63;

/// A source cell and the grid rectangle it occupies
#[derive(Debug, Clone)]
pub struct Placement<'a> {
    pub cell: &'a Node,
    /// Cells of a row wider than [`MAX_COLUMNS`], rendered after `cell`
    pub overflow: Vec<&'a Node>,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl Placement<'_> {
    pub fn is_spanning(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

/// One grid position
#[derive(Debug, Clone)]
pub enum Slot<'a> {
    /// Not covered by any cell (a short row)
    Vacant,
    /// Covered by the span of the cell starting at `row`/`col`
    Covered { row: usize, col: usize },
    /// Top-left position of a source cell
    Cell(Placement<'a>),
}

/// Normalized grid of a table node
#[derive(Debug, Clone)]
pub struct TableMatrix<'a> {
    rows: usize,
    cols: usize,
    slots: Vec<Slot<'a>>,
}

impl<'a> TableMatrix<'a> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn slot(&self, row: usize, col: usize) -> Option<&Slot<'a>> {
        if row < self.rows && col < self.cols {
            self.slots.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Placed cells in row-major order of their top-left position
    pub fn placements(&self) -> impl Iterator<Item = &Placement<'a>> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Cell(placement) => Some(placement),
            _ => None,
        })
    }
}

/// Build the grid for a table node
///
/// Pure and deterministic: the node is only read.
pub fn normalize(table: &Node) -> TableMatrix<'_> {
    let rows = &table.nodes;
    let row_count = rows.len();
    let mut cols = discover_column_count(rows);

    let mut placements: Vec<Placement<'_>> = Vec::new();
    // column -> rows still covered by a cell from an earlier row
    let mut pending: BTreeMap<usize, usize> = BTreeMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        let mut cursor = 0;

        for (cell_index, cell) in row.nodes.iter().enumerate() {
            while pending.contains_key(&cursor) {
                cursor += 1;
            }

            if cursor >= MAX_COLUMNS {
                match placements.last_mut() {
                    Some(previous) => {
                        log::warn!(
                            "Row {} has more than {} columns, appending cell to row {}, column {}",
                            row_index,
                            MAX_COLUMNS,
                            previous.row,
                            previous.col
                        );
                        previous.overflow.push(cell);
                    }
                    None => log::warn!("Dropping table cell at row {}: no column left", row_index),
                }
                continue;
            }
            if cursor >= cols {
                log::debug!(
                    "Widening table from {} to {} columns at row {}",
                    cols,
                    cursor + 1,
                    row_index
                );
                cols = cursor + 1;
            }

            // A span must stop before a column an earlier row still holds
            let limit = pending
                .range(cursor..)
                .next()
                .map(|(col, _)| *col)
                .unwrap_or(cols);

            // and must leave a free column for each cell still to come
            let free_after = (cursor + 1..MAX_COLUMNS)
                .filter(|col| !pending.contains_key(col))
                .count();
            let still_to_come = row.nodes.len() - cell_index - 1;
            let max_span = free_after - still_to_come.min(free_after) + 1;

            let row_span = cell.row_span().resolve(row_index, row_count);
            let col_span = cell.col_span().resolve(cursor, limit).min(max_span);

            for col in cursor..cursor + col_span {
                pending.insert(col, row_span);
            }

            placements.push(Placement {
                cell,
                overflow: Vec::new(),
                row: row_index,
                col: cursor,
                row_span,
                col_span,
            });
            cursor += col_span;
        }

        pending.retain(|_, remaining| {
            *remaining -= 1;
            *remaining > 0
        });
    }

    let mut slots = vec![Slot::Vacant; row_count * cols];
    for placement in placements {
        for row in placement.row..placement.row + placement.row_span {
            for col in placement.col..placement.col + placement.col_span {
                slots[row * cols + col] = Slot::Covered {
                    row: placement.row,
                    col: placement.col,
                };
            }
        }
        let anchor = placement.row * cols + placement.col;
        slots[anchor] = Slot::Cell(placement);
    }

    TableMatrix {
        rows: row_count,
        cols,
        slots,
    }
}

/// Widest row of the table, counting spans
///
/// For each row: the column spans of every cell but the last, plus one for
/// the last cell, plus the number of vertical spans still open from the
/// rows above. A "to the end" column span counts as one here.
fn discover_column_count(rows: &[Node]) -> usize {
    let row_count = rows.len();
    let mut open_spans: Vec<usize> = Vec::new();
    let mut cols = 0;

    for (row_index, row) in rows.iter().enumerate() {
        let cells = &row.nodes;
        let leading = &cells[..cells.len().saturating_sub(1)];
        let in_row = leading
            .iter()
            .map(|cell| cell.col_span().count_or_one())
            .fold(1usize, usize::saturating_add);

        cols = cols.max(in_row.saturating_add(open_spans.len()));

        open_spans = open_spans
            .into_iter()
            .chain(cells.iter().map(|cell| match cell.row_span() {
                Span::Count(n) => n,
                Span::ToEnd => row_count - row_index,
            }))
            .map(|remaining| remaining - 1)
            .filter(|remaining| *remaining > 0)
            .collect();
    }

    if cols > MAX_COLUMNS {
        log::warn!(
            "Table declares {} columns, limiting to {}",
            cols,
            MAX_COLUMNS
        );
    }
    cols.min(MAX_COLUMNS)
}
