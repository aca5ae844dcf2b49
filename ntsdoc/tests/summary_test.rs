//! End-to-end tests driving the public API with inline project records

use ntsdoc::layout::{Block, BlockContainer, OutputTable};
use ntsdoc::{build_summary, summary_document, ProjectRecord, RenderConfig};
use serde_json::{json, Value};

fn project(data: Value) -> ProjectRecord {
    serde_json::from_value(json!({
        "project": {"title": "Cardiac regeneration in zebrafish"},
        "data": data
    }))
    .unwrap()
}

fn editor(nodes: Value) -> String {
    json!({"document": {"nodes": nodes}}).to_string()
}

fn summary_table(project: &ProjectRecord) -> OutputTable {
    let summary = summary_document(project, &RenderConfig::default());
    match summary.body.blocks.as_slice() {
        [Block::Table(table)] => table.clone(),
        other => panic!("expected the summary table, got {:?}", other),
    }
}

fn cell(text: &str) -> Value {
    json!({"type": "table-cell", "nodes": [
        {"type": "paragraph", "nodes": [{"leaves": [{"text": text}]}]}
    ]})
}

fn spanning_cell(text: &str, row_span: Value, col_span: Value) -> Value {
    let mut value = cell(text);
    value["data"] = json!({"rowSpan": row_span, "colSpan": col_span});
    value
}

#[test]
fn test_full_record_builds_docx() {
    let record = project(json!({
        "purpose": ["purpose-a", "purpose-f"],
        "purpose-b": ["purpose-b1"],
        "duration": {"years": 5, "months": 0},
        "nts-objectives": editor(json!([
            {"type": "heading-one", "nodes": [{"leaves": [{"text": "Aims"}]}]},
            {"type": "paragraph", "nodes": [{"leaves": [
                {"text": "We study "},
                {"text": "heart", "marks": [{"type": "bold"}]},
                {"text": " repair."}
            ]}]}
        ])),
        "nts-benefits": editor(json!([
            {"type": "numbered-list", "nodes": [
                {"type": "list-item", "nodes": [{"leaves": [{"text": "First"}]}]},
                {"type": "list-item", "nodes": [{"leaves": [{"text": "Second"}]}]}
            ]}
        ])),
        "nts-numbers": editor(json!([
            {"type": "table", "nodes": [
                {"type": "table-row", "nodes": [cell("Species"), cell("Number")]},
                {"type": "table-row", "nodes": [cell("Zebrafish"), cell("4000")]}
            ]}
        ])),
        "nts-refinement": "not json at all"
    }));

    let bytes = build_summary(&record, &RenderConfig::default()).unwrap();
    assert!(bytes.starts_with(b"PK"));
    let needle = b"word/document.xml";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn test_empty_record_still_builds() {
    let record = ProjectRecord::from_json("{}").unwrap();
    let table = summary_table(&record);
    assert_eq!((table.rows(), table.cols()), (19, 3));

    let bytes = build_summary(&record, &RenderConfig::default()).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_nested_table_merges_spanning_cells() {
    let record = project(json!({
        "nts-numbers": editor(json!([
            {"type": "table", "nodes": [
                {"type": "table-row", "nodes": [
                    spanning_cell("Species", json!(1), json!(2)),
                    spanning_cell("Notes", json!(0), json!(1))
                ]},
                {"type": "table-row", "nodes": [cell("Mouse"), cell("1000")]},
                {"type": "table-row", "nodes": [cell("Rat"), cell("200")]}
            ]}
        ]))
    }));

    let summary = summary_table(&record);
    let numbers = summary.cell(13, 1).unwrap();
    let nested = match numbers.blocks() {
        [Block::Table(table)] => table,
        other => panic!("expected a nested table, got {:?}", other),
    };

    assert_eq!((nested.rows(), nested.cols()), (3, 3));
    let header = nested.merge_at(0, 1).unwrap();
    assert_eq!((header.row, header.col, header.rows, header.cols), (0, 0, 1, 2));
    let notes = nested.merge_at(2, 2).unwrap();
    assert_eq!((notes.row, notes.col, notes.rows, notes.cols), (0, 2, 3, 1));
    assert_eq!(nested.cell(0, 2).unwrap().texts(), vec!["Notes"]);
    assert_eq!(nested.cell(2, 1).unwrap().texts(), vec!["200"]);
}

#[test]
fn test_list_numbering_is_registered() {
    let record = project(json!({
        "nts-benefits": editor(json!([
            {"type": "numbered-list", "nodes": [
                {"type": "list-item", "nodes": [
                    {"leaves": [{"text": "Outer"}]},
                    {"type": "numbered-list", "nodes": [
                        {"type": "list-item", "nodes": [{"leaves": [{"text": "Inner"}]}]}
                    ]}
                ]}
            ]},
            {"type": "bulleted-list", "nodes": [
                {"type": "list-item", "nodes": [{"leaves": [{"text": "Point"}]}]}
            ]}
        ]))
    }));

    let summary = summary_document(&record, &RenderConfig::default());
    assert_eq!(summary.numbering.definitions().len(), 3);

    let table = match summary.body.blocks.as_slice() {
        [Block::Table(table)] => table,
        other => panic!("expected the summary table, got {:?}", other),
    };
    let paragraphs = table.cell(12, 1).unwrap().paragraphs();
    let levels: Vec<(String, usize)> = paragraphs
        .iter()
        .map(|p| (p.text(), p.numbering.map(|n| n.level).unwrap_or(99)))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("Outer".to_string(), 0),
            ("Inner".to_string(), 1),
            ("Point".to_string(), 0)
        ]
    );
}

#[test]
fn test_illegal_characters_are_stripped() {
    let record = project(json!({
        "nts-objectives": editor(json!([
            {"type": "paragraph", "nodes": [{"leaves": [{"text": "Bad\u{0}\u{1}text"}]}]}
        ]))
    }));

    let table = summary_table(&record);
    assert_eq!(table.cell(11, 1).unwrap().texts(), vec!["Badtext"]);
}

#[test]
fn test_config_changes_styles() {
    let config = RenderConfig::from_toml("font_family = \"Arial\"\ncontent_width = 9000").unwrap();
    let record = ProjectRecord::from_json(r#"{"project": {"title": "T"}}"#).unwrap();

    let summary = summary_document(&record, &config);
    assert!(summary.styles.iter().all(|style| style.font == "Arial"));
    assert!(build_summary(&record, &config).unwrap().starts_with(b"PK"));
}
