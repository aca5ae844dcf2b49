//! In-memory model of the output document
//!
//! The renderer builds this model; [`crate::docx_writer`] turns it into
//! bytes. Keeping the two apart lets tables be assembled, merged and, when a
//! merge is rejected, rebuilt before anything is encoded.

use crate::numbering::NumberingHandle;
use crate::rich_text::MarkType;
use crate::sanitize::strip_invalid_xml_chars;
use crate::styles::StyleName;
use std::fmt;
use thiserror::Error;

/// A span of text with its character formatting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub subscript: bool,
    pub superscript: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Switch on the formatting for one mark; marks stack
    pub fn apply(&mut self, mark: MarkType) {
        match mark {
            MarkType::Bold => self.bold = true,
            MarkType::Italic => self.italic = true,
            MarkType::Underline => self.underline = true,
            MarkType::Subscript => self.subscript = true,
            MarkType::Superscript => self.superscript = true,
        }
    }

    /// Check if this run has any formatting applied
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.underline || self.subscript || self.superscript
    }
}

/// A styled paragraph, optionally part of a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: StyleName,
    pub numbering: Option<NumberingHandle>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(style: StyleName) -> Self {
        Self {
            style,
            numbering: None,
            runs: Vec::new(),
        }
    }

    /// Paragraph holding one plain run; text that sanitizes to nothing adds no run
    pub fn with_text(style: StyleName, text: &str) -> Self {
        let mut paragraph = Self::new(style);
        let text = strip_invalid_xml_chars(text);
        if !text.is_empty() {
            paragraph.runs.push(Run::new(text));
        }
        paragraph
    }

    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// An image placed directly in the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    /// `data:` URI or local path
    pub src: String,
    /// Width in pixels, if the editor recorded one
    pub width: Option<u32>,
    /// Height in pixels, if the editor recorded one
    pub height: Option<u32>,
}

/// Block-level content of a document or table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(OutputTable),
    Image(ImageBlock),
}

/// Anything the renderer can insert blocks into
pub trait BlockContainer {
    fn add_block(&mut self, block: Block);

    fn blocks(&self) -> &[Block];

    fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.add_block(Block::Paragraph(paragraph));
    }

    /// Paragraphs directly inside this container, skipping tables and images
    fn paragraphs(&self) -> Vec<&Paragraph> {
        self.blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

/// The document body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocument {
    pub blocks: Vec<Block>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockContainer for OutputDocument {
    fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// One grid position of an output table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputCell {
    pub blocks: Vec<Block>,
}

impl OutputCell {
    /// Text of every paragraph in the cell, one entry per paragraph
    pub fn texts(&self) -> Vec<String> {
        self.paragraphs().iter().map(|p| p.text()).collect()
    }
}

impl BlockContainer for OutputCell {
    fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// A rectangle of grid positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl CellRange {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.rows).contains(&row)
            && (self.col..self.col + self.cols).contains(&col)
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.row < other.row + other.rows
            && other.row < self.row + self.rows
            && self.col < other.col + other.cols
            && other.col < self.col + self.cols
    }

    fn last_row(&self) -> usize {
        self.row + self.rows - 1
    }

    fn last_col(&self) -> usize {
        self.col + self.cols - 1
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}-{}, columns {}-{}",
            self.row,
            self.last_row(),
            self.col,
            self.last_col()
        )
    }
}

/// A merge request that the current table state cannot honour
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeConflict {
    #[error("merge of {range} is outside the {rows}x{cols} table")]
    OutOfRange {
        range: CellRange,
        rows: usize,
        cols: usize,
    },

    #[error("merge range ends ({last}) before it starts ({first})")]
    Reversed { first: usize, last: usize },

    #[error("merge of {requested} overlaps existing merge of {existing}")]
    Overlap {
        requested: CellRange,
        existing: CellRange,
    },
}

/// A rectangular table with merge regions
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    rows: usize,
    cols: usize,
    cells: Vec<OutputCell>,
    merges: Vec<CellRange>,
}

impl OutputTable {
    /// Create an empty, unmerged table
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![OutputCell::default(); rows * cols],
            merges: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&OutputCell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut OutputCell> {
        if row < self.rows && col < self.cols {
            self.cells.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// Merge regions in the order they were created
    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// The merge region covering a grid position, if any
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&CellRange> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    /// Merge `first_row..=last_row` of column `col` into one cell
    pub fn merge_vertical(
        &mut self,
        col: usize,
        first_row: usize,
        last_row: usize,
    ) -> Result<(), MergeConflict> {
        if last_row < first_row {
            return Err(MergeConflict::Reversed {
                first: first_row,
                last: last_row,
            });
        }
        let range = CellRange {
            row: first_row,
            col,
            rows: last_row - first_row + 1,
            cols: 1,
        };
        self.check_bounds(&range)?;
        if range.rows == 1 {
            return Ok(());
        }

        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            if *existing == range {
                return Ok(());
            }
            return Err(MergeConflict::Overlap {
                requested: range,
                existing: *existing,
            });
        }

        self.merges.push(range);
        Ok(())
    }

    /// Merge `first_col..=last_col` of row `row` into one cell
    ///
    /// When `row`/`first_col` is the top of a single-column vertical merge,
    /// that merge is widened so the whole rectangle becomes one cell.
    pub fn merge_horizontal(
        &mut self,
        row: usize,
        first_col: usize,
        last_col: usize,
    ) -> Result<(), MergeConflict> {
        if last_col < first_col {
            return Err(MergeConflict::Reversed {
                first: first_col,
                last: last_col,
            });
        }
        let range = CellRange {
            row,
            col: first_col,
            rows: 1,
            cols: last_col - first_col + 1,
        };
        self.check_bounds(&range)?;
        if range.cols == 1 {
            return Ok(());
        }

        let overlapping: Vec<usize> = self
            .merges
            .iter()
            .enumerate()
            .filter(|(_, m)| m.intersects(&range))
            .map(|(i, _)| i)
            .collect();

        match overlapping.as_slice() {
            [] => {
                self.merges.push(range);
                Ok(())
            }
            [index] => {
                let existing = self.merges[*index];
                if existing == range {
                    return Ok(());
                }
                let widened = CellRange {
                    cols: range.cols,
                    ..existing
                };
                let clear = self
                    .merges
                    .iter()
                    .enumerate()
                    .all(|(i, m)| i == *index || !m.intersects(&widened));
                if existing.row == row && existing.col == first_col && existing.cols == 1 && clear
                {
                    self.merges[*index] = widened;
                    Ok(())
                } else {
                    Err(MergeConflict::Overlap {
                        requested: range,
                        existing,
                    })
                }
            }
            [first, ..] => Err(MergeConflict::Overlap {
                requested: range,
                existing: self.merges[*first],
            }),
        }
    }

    fn check_bounds(&self, range: &CellRange) -> Result<(), MergeConflict> {
        if range.last_row() >= self.rows || range.last_col() >= self.cols {
            return Err(MergeConflict::OutOfRange {
                range: *range,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}
