//! Conversion of rich-text trees into output blocks
//!
//! [`Renderer::render_node`] dispatches on the node type. Output goes to any
//! [`BlockContainer`], which is either the document body or a table cell, so
//! tables can render their cells with the same code.

use crate::layout::{
    Block, BlockContainer, ImageBlock, MergeConflict, OutputTable, Paragraph, Run,
};
use crate::matrix::{self, TableMatrix};
use crate::numbering::{NumberingHandle, NumberingRegistry};
use crate::rich_text::{LooseNumber, Node, NodeKind, RichText};
use crate::sanitize::strip_invalid_xml_chars;
use crate::styles::StyleName;

/// Walks rich-text trees, allocating list numbering as it goes
pub struct Renderer<'a> {
    numbering: &'a mut NumberingRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(numbering: &'a mut NumberingRegistry) -> Self {
        Self { numbering }
    }

    /// Render every top-level block of a field
    pub fn render_rich_text(&mut self, container: &mut dyn BlockContainer, text: &RichText) {
        for node in &text.nodes {
            self.render_node(container, node, 0, None);
        }
    }

    /// Render one node into `container`
    ///
    /// `depth` is the list nesting depth. `paragraph` is the paragraph a list
    /// item is collecting inline content into; paragraph-like nodes append to
    /// it instead of starting their own, and the list item inserts it.
    pub fn render_node(
        &mut self,
        container: &mut dyn BlockContainer,
        node: &Node,
        depth: usize,
        paragraph: Option<&mut Paragraph>,
    ) {
        match &node.kind {
            NodeKind::Heading1 => render_heading(container, node, StyleName::Heading1),
            NodeKind::Heading2 => render_heading(container, node, StyleName::Heading2),
            NodeKind::Quote => render_heading(container, node, StyleName::Aside),
            NodeKind::TableCell => {
                for child in &node.nodes {
                    self.render_node(container, child, 0, None);
                }
            }
            NodeKind::Table => self.render_table(container, node),
            NodeKind::NumberedList => {
                let handle = self.numbering.allocate(depth);
                for item in &node.nodes {
                    self.render_list_item(container, item, depth, Some(handle));
                }
            }
            NodeKind::BulletedList => {
                for item in &node.nodes {
                    self.render_list_item(container, item, depth, None);
                }
            }
            NodeKind::Paragraph => render_paragraph(container, node, paragraph),
            NodeKind::Image => render_image(container, node),
            other => {
                if node.nodes.is_empty() && node.has_own_text() {
                    // Denormalized text with no wrapping paragraph
                    let wrapped = Node::block(NodeKind::Paragraph, vec![node.clone()]);
                    render_paragraph(container, &wrapped, paragraph);
                } else {
                    log::debug!("Skipping {:?} node without renderable content", other);
                }
            }
        }
    }

    fn render_list_item(
        &mut self,
        container: &mut dyn BlockContainer,
        item: &Node,
        depth: usize,
        numbering: Option<NumberingHandle>,
    ) {
        if item.kind != NodeKind::ListItem {
            self.render_node(container, item, depth, None);
            return;
        }

        let handle = numbering.unwrap_or_else(|| self.numbering.bullet(depth));
        let mut pending = Some(Paragraph {
            numbering: Some(handle),
            ..Paragraph::new(StyleName::Body)
        });

        for child in &item.nodes {
            if renders_inline(child) {
                self.render_node(container, child, depth + 1, pending.as_mut());
            } else {
                // Keep the item's text ahead of nested lists and tables.
                // Inline children after this point become plain body paragraphs.
                if let Some(paragraph) = pending.take() {
                    if !paragraph.runs.is_empty() {
                        container.add_paragraph(paragraph);
                    }
                }
                self.render_node(container, child, depth + 1, None);
            }
        }

        if let Some(paragraph) = pending {
            container.add_paragraph(paragraph);
        }
    }

    fn render_table(&mut self, container: &mut dyn BlockContainer, node: &Node) {
        let matrix = matrix::normalize(node);
        if matrix.is_empty() {
            log::warn!("Skipping table without rows or columns");
            return;
        }

        let table = OutputTable::new(matrix.rows(), matrix.cols());
        let table = self.assemble_table(&matrix, table);
        container.add_block(Block::Table(table));
    }

    /// Fill `table` from the matrix and merge spanning cells
    ///
    /// If any merge is rejected the table is thrown away and a fresh one of
    /// the same size is filled without merges, so content survives even when
    /// the layout cannot.
    pub fn assemble_table(
        &mut self,
        matrix: &TableMatrix<'_>,
        mut table: OutputTable,
    ) -> OutputTable {
        self.populate_table(matrix, &mut table);

        match merge_cells(matrix, &mut table) {
            Ok(()) => table,
            Err(e) => {
                log::warn!("Failed to merge cells, rendering table unmerged: {}", e);
                let mut fresh = OutputTable::new(matrix.rows(), matrix.cols());
                self.populate_table(matrix, &mut fresh);
                fresh
            }
        }
    }

    /// Render each placed source cell into its top-left output cell
    pub fn populate_table(&mut self, matrix: &TableMatrix<'_>, table: &mut OutputTable) {
        for placement in matrix.placements() {
            match table.cell_mut(placement.row, placement.col) {
                Some(cell) => {
                    self.render_node(cell, placement.cell, 0, None);
                    for extra in &placement.overflow {
                        self.render_node(cell, extra, 0, None);
                    }
                }
                None => log::warn!(
                    "No output cell at row {}, column {}",
                    placement.row,
                    placement.col
                ),
            }
        }
    }
}

/// Merge every spanning cell: all vertical merges first, then horizontal
pub fn merge_cells(
    matrix: &TableMatrix<'_>,
    table: &mut OutputTable,
) -> Result<(), MergeConflict> {
    for p in matrix.placements().filter(|p| p.row_span > 1) {
        table.merge_vertical(p.col, p.row, p.row + p.row_span - 1)?;
    }
    for p in matrix.placements().filter(|p| p.col_span > 1) {
        table.merge_horizontal(p.row, p.col, p.col + p.col_span - 1)?;
    }
    Ok(())
}

/// Whether a list item child contributes to the item's own paragraph
fn renders_inline(node: &Node) -> bool {
    !matches!(
        node.kind,
        NodeKind::Heading1
            | NodeKind::Heading2
            | NodeKind::Quote
            | NodeKind::BulletedList
            | NodeKind::NumberedList
            | NodeKind::Table
            | NodeKind::TableCell
            | NodeKind::Image
    )
}

fn render_heading(container: &mut dyn BlockContainer, node: &Node, style: StyleName) {
    let text = node.first_leaf_text();
    container.add_paragraph(Paragraph::with_text(style, text.trim()));
}

fn render_paragraph(
    container: &mut dyn BlockContainer,
    node: &Node,
    paragraph: Option<&mut Paragraph>,
) {
    match paragraph {
        Some(paragraph) => append_runs(paragraph, node),
        None => {
            let mut paragraph = Paragraph::new(StyleName::Body);
            append_runs(&mut paragraph, node);
            container.add_paragraph(paragraph);
        }
    }
}

fn append_runs(paragraph: &mut Paragraph, node: &Node) {
    for inline in node.inline_texts() {
        let text = strip_invalid_xml_chars(inline.text);
        if text.is_empty() {
            continue;
        }
        let mut run = Run::new(text);
        for mark in inline.marks {
            run.apply(*mark);
        }
        paragraph.add_run(run);
    }
}

fn render_image(container: &mut dyn BlockContainer, node: &Node) {
    let Some(src) = node.data.src.as_deref().filter(|s| !s.is_empty()) else {
        log::warn!("Skipping image without a source");
        return;
    };

    let pixels = |value: Option<&LooseNumber>| {
        value
            .and_then(|v| v.as_int())
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
    };

    container.add_block(Block::Image(ImageBlock {
        src: src.to_string(),
        width: pixels(node.data.width.as_ref()),
        height: pixels(node.data.height.as_ref()),
    }));
}
