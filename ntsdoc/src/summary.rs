//! Assembly of the non-technical summary document
//!
//! The summary is a single 19 x 3 table: static labels in the first column,
//! the project's answers in the merged value column, and one checkbox row per
//! purpose.

use crate::docx_writer;
use crate::error::BuildError;
use crate::layout::{
    Block, BlockContainer, MergeConflict, OutputDocument, OutputTable, Paragraph,
};
use crate::numbering::NumberingRegistry;
use crate::project::{NarrativeField, ProjectRecord};
use crate::render::Renderer;
use crate::render_config::RenderConfig;
use crate::styles::{StyleName, StyleRegistry};

const ROWS: usize = 19;
const COLS: usize = 3;

/// First row of the purpose checkboxes
const FIRST_PURPOSE_ROW: usize = 3;

/// Purposes as listed in section 5C(3) of the Act, in row order
pub const PURPOSES: [(char, &str); 7] = [
    ('a', "Basic research"),
    ('b', "Translational and applied research"),
    ('c', "Regulatory use and routine production"),
    (
        'd',
        "Protection of the natural environment in the interests of the health or welfare of humans or animals",
    ),
    ('e', "Preservation of species"),
    ('f', "Higher education or training"),
    ('g', "Forensic enquiries"),
];

/// Row without a checkbox value that closes the purpose block
const COLONY_MAINTENANCE: &str = "Maintenance of colonies of genetically altered animals";

/// A row holding labels on the left and a narrative answer on the right
struct SectionRow {
    row: usize,
    labels: &'static [(StyleName, &'static str)],
    field: Option<NarrativeField>,
}

const SECTION_ROWS: [SectionRow; 8] = [
    SectionRow {
        row: 11,
        labels: &[(
            StyleName::Body,
            "Describe the objectives of the project (e.g. the scientific unknowns or scientific/clinical needs being addressed)",
        )],
        field: Some(NarrativeField::Objectives),
    },
    SectionRow {
        row: 12,
        labels: &[(
            StyleName::Body,
            "What are the potential benefits likely to derive from this project (how science could be advanced or humans or animals could benefit from the project)?",
        )],
        field: Some(NarrativeField::Benefits),
    },
    SectionRow {
        row: 13,
        labels: &[(
            StyleName::Body,
            "What species and approximate numbers of animals do you expect to use over what period of time?",
        )],
        field: Some(NarrativeField::Numbers),
    },
    SectionRow {
        row: 14,
        labels: &[(
            StyleName::Body,
            "In the context of what you propose to do to the animals, what are the expected adverse effects and the likely/expected level of severity? What will happen to the animals at the end?",
        )],
        field: Some(NarrativeField::AdverseEffects),
    },
    SectionRow {
        row: 15,
        labels: &[(StyleName::Body, "Application of the 3Rs")],
        field: None,
    },
    SectionRow {
        row: 16,
        labels: &[
            (StyleName::Heading2, "1. Replacement"),
            (
                StyleName::Body,
                "State why you need to use animals and why you cannot use non-animal alternatives",
            ),
        ],
        field: Some(NarrativeField::Replacement),
    },
    SectionRow {
        row: 17,
        labels: &[
            (StyleName::Heading2, "2. Reduction"),
            (
                StyleName::Body,
                "Explain how you will assure the use of minimum numbers of animals",
            ),
        ],
        field: Some(NarrativeField::Reduction),
    },
    SectionRow {
        row: 18,
        labels: &[
            (StyleName::Heading2, "3. Refinement"),
            (
                StyleName::Body,
                "Explain the choice of species and why the animal model(s) you will use are the most refined, having regard to the objectives. Explain the general measures you will take to minimise welfare costs (harms) to the animals.",
            ),
        ],
        field: Some(NarrativeField::Refinement),
    },
];

/// Everything produced by one build, before encoding
#[derive(Debug, Clone)]
pub struct SummaryDocument {
    pub styles: StyleRegistry,
    pub numbering: NumberingRegistry,
    pub body: OutputDocument,
}

/// Build and serialize the summary document for a project
///
/// # Parameters
/// * `project` - The project record to summarise
/// * `config` - Rendering configuration
///
/// # Returns
/// * `Ok(Vec<u8>)` - The encoded document
/// * `Err(BuildError)` - The document could not be serialized
pub fn build_summary(
    project: &ProjectRecord,
    config: &RenderConfig,
) -> Result<Vec<u8>, BuildError> {
    let summary = summary_document(project, config);
    docx_writer::to_docx(&summary.body, &summary.styles, &summary.numbering, config)
}

/// Lay out the summary document without encoding it
pub fn summary_document(project: &ProjectRecord, config: &RenderConfig) -> SummaryDocument {
    log::info!("Building summary for project '{}'", project.title());

    let styles = StyleRegistry::new(config);
    let mut numbering = NumberingRegistry::new(config);
    let mut body = OutputDocument::new();

    let table = summary_table(project, &mut Renderer::new(&mut numbering));
    body.add_block(Block::Table(table));

    log::info!(
        "Summary laid out with {} numbering definitions",
        numbering.definitions().len()
    );

    SummaryDocument {
        styles,
        numbering,
        body,
    }
}

/// Merge the label and value cells of the fixed layout
pub fn apply_layout_merges(table: &mut OutputTable) -> Result<(), MergeConflict> {
    for row in 0..FIRST_PURPOSE_ROW {
        table.merge_horizontal(row, 1, 2)?;
    }
    table.merge_vertical(0, FIRST_PURPOSE_ROW, FIRST_PURPOSE_ROW + PURPOSES.len())?;
    for section in &SECTION_ROWS {
        table.merge_horizontal(section.row, 1, 2)?;
    }
    Ok(())
}

fn summary_table(project: &ProjectRecord, renderer: &mut Renderer<'_>) -> OutputTable {
    let mut table = OutputTable::new(ROWS, COLS);
    if let Err(e) = apply_layout_merges(&mut table) {
        log::warn!("Summary layout merge failed, continuing unmerged: {}", e);
    }

    write_cell(&mut table, 0, 0, StyleName::Heading2, "Project");
    write_cell(&mut table, 0, 1, StyleName::Heading2, project.title());

    write_cell(&mut table, 1, 0, StyleName::Body, "Key Words (max. 5 words)");

    write_cell(
        &mut table,
        2,
        0,
        StyleName::Body,
        "Expected duration of the project (yrs)",
    );
    if let Some(duration) = &project.data.duration {
        write_cell(&mut table, 2, 1, StyleName::Body, &duration.describe());
    }

    write_cell(
        &mut table,
        FIRST_PURPOSE_ROW,
        0,
        StyleName::Body,
        "Purpose of the project as in ASPA section 5C(3) (Mark all boxes that apply)",
    );
    for (offset, (letter, label)) in PURPOSES.iter().enumerate() {
        let row = FIRST_PURPOSE_ROW + offset;
        let mark = if project.data.has_purpose(*letter) { "X" } else { " " };
        write_cell(&mut table, row, 1, StyleName::Body, mark);
        write_cell(&mut table, row, 2, StyleName::Body, label);
    }
    let colony_row = FIRST_PURPOSE_ROW + PURPOSES.len();
    write_cell(&mut table, colony_row, 1, StyleName::Body, " ");
    write_cell(&mut table, colony_row, 2, StyleName::Body, COLONY_MAINTENANCE);

    for section in &SECTION_ROWS {
        for (style, label) in section.labels {
            write_cell(&mut table, section.row, 0, *style, label);
        }
        if let Some(field) = section.field {
            let text = project.data.narrative(field);
            if let Some(cell) = table.cell_mut(section.row, 1) {
                renderer.render_rich_text(cell, &text);
            }
        }
    }

    table
}

fn write_cell(table: &mut OutputTable, row: usize, col: usize, style: StyleName, text: &str) {
    if let Some(cell) = table.cell_mut(row, col) {
        cell.add_paragraph(Paragraph::with_text(style, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CellRange;
    use serde_json::json;

    fn layout(value: serde_json::Value) -> OutputTable {
        let project: ProjectRecord = serde_json::from_value(value).unwrap();
        let summary = summary_document(&project, &RenderConfig::default());
        match summary.body.blocks.as_slice() {
            [Block::Table(table)] => table.clone(),
            other => panic!("expected a single table, got {:?}", other),
        }
    }

    fn texts(table: &OutputTable, row: usize, col: usize) -> Vec<String> {
        table.cell(row, col).unwrap().texts()
    }

    #[test]
    fn test_layout_merges() {
        let mut table = OutputTable::new(ROWS, COLS);
        apply_layout_merges(&mut table).unwrap();

        assert_eq!(table.merges().len(), 12);
        assert_eq!(
            table.merge_at(7, 0),
            Some(&CellRange {
                row: 3,
                col: 0,
                rows: 8,
                cols: 1
            })
        );
        for row in (0..3).chain(11..19) {
            let merge = table.merge_at(row, 2).unwrap();
            assert_eq!((merge.row, merge.col, merge.cols), (row, 1, 2));
        }
        assert!(table.merge_at(5, 1).is_none());
    }

    #[test]
    fn test_purpose_rows() {
        let table = layout(json!({
            "project": {"title": "Zebrafish development"},
            "data": {"purpose": ["purpose-a", "purpose-c"], "purpose-b": ""}
        }));

        let marks: Vec<String> = (3..=10).map(|row| texts(&table, row, 1).concat()).collect();
        assert_eq!(marks, vec!["X", " ", "X", " ", " ", " ", " ", " "]);
        assert_eq!(texts(&table, 3, 2), vec!["Basic research"]);
        assert_eq!(texts(&table, 10, 2), vec![COLONY_MAINTENANCE]);
    }

    #[test]
    fn test_header_rows() {
        let table = layout(json!({
            "project": {"title": "Zebrafish development"},
            "data": {"duration": {"years": 5, "months": 0}}
        }));

        let title = table.cell(0, 1).unwrap().paragraphs()[0].clone();
        assert_eq!(title.style, StyleName::Heading2);
        assert_eq!(title.text(), "Zebrafish development");
        assert_eq!(texts(&table, 2, 1), vec!["5 Years 0 Months"]);
        assert!(table.cell(1, 1).unwrap().blocks.is_empty());
    }

    #[test]
    fn test_narrative_sections_rendered_in_value_column() {
        let objectives = json!({"document": {"nodes": [
            {"type": "paragraph", "nodes": [{"leaves": [{"text": "Hello", "marks": ["bold"]}]}]}
        ]}});
        let table = layout(json!({
            "project": {"title": "T"},
            "data": {
                "nts-objectives": objectives.to_string(),
                "nts-refinement": "not json"
            }
        }));

        let cell = table.cell(11, 1).unwrap();
        let paragraphs = cell.paragraphs();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].runs.len(), 1);
        assert!(paragraphs[0].runs[0].bold);
        assert_eq!(paragraphs[0].text(), "Hello");

        assert!(table.cell(18, 1).unwrap().blocks.is_empty());
        assert_eq!(texts(&table, 18, 0)[0], "3. Refinement");
    }
}
