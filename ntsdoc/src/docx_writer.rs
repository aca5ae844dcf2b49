//! DOCX encoding using the docx-rs library
//!
//! Turns the in-memory [`OutputDocument`] into a WordprocessingML package.
//! Styles and numbering definitions are written first, then the body.

use crate::error::BuildError;
use crate::layout::{self, Block, ImageBlock, OutputDocument, OutputTable};
use crate::numbering::{NumberingDef, NumberingRegistry};
use crate::render_config::RenderConfig;
use crate::styles::{StyleDef, StyleRegistry};
use base64::Engine;
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing,
    NumberFormat, Numbering, NumberingId, Paragraph, Pic, Run, RunFonts, SpecialIndentType, Start,
    Style, StyleType, Table, TableCell, TableRow, VMergeType, VertAlignType, WidthType,
};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// EMUs (English Metric Units) per pixel at 96 DPI
const EMUS_PER_PIXEL: u32 = 9525;

/// Pixel size used when neither the editor nor the image itself gives one
const FALLBACK_IMAGE_SIZE: (u32, u32) = (576, 384);

/// Encode a laid-out document
///
/// # Parameters
/// * `body` - The document content
/// * `styles` - Styles referenced by the content
/// * `numbering` - Numbering definitions referenced by list paragraphs
/// * `config` - Rendering configuration (column and image widths)
///
/// # Returns
/// * `Ok(Vec<u8>)` - The packed .docx file
/// * `Err(BuildError)` - Packing failed
pub fn to_docx(
    body: &OutputDocument,
    styles: &StyleRegistry,
    numbering: &NumberingRegistry,
    config: &RenderConfig,
) -> Result<Vec<u8>, BuildError> {
    log::info!("Creating DOCX with docx-rs: {} blocks", body.blocks.len());
    let docx = create_docx(body, styles, numbering, config);

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| BuildError::Serialization(format!("Failed to write DOCX: {}", e)))?;

    let bytes = buffer.into_inner();
    log::info!("Wrote DOCX ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Assemble the docx-rs document: styles, numbering definitions, then the body
fn create_docx(
    body: &OutputDocument,
    styles: &StyleRegistry,
    numbering: &NumberingRegistry,
    config: &RenderConfig,
) -> Docx {
    let mut docx = Docx::new();

    for style in styles.iter() {
        docx = docx.add_style(create_style(style));
    }

    for def in numbering.definitions() {
        docx = docx
            .add_abstract_numbering(create_abstract_numbering(def))
            .add_numbering(Numbering::new(def.id, def.id));
    }

    for block in &body.blocks {
        docx = match block {
            Block::Paragraph(paragraph) => docx.add_paragraph(create_paragraph(paragraph)),
            Block::Table(table) => docx.add_table(create_table(table, config)),
            Block::Image(image) => match create_image_paragraph(image, config) {
                Some(paragraph) => docx.add_paragraph(paragraph),
                None => docx,
            },
        };
    }

    docx
}

/// Create a docx-rs paragraph style from a registered style
fn create_style(def: &StyleDef) -> Style {
    let mut style = Style::new(def.name.id(), StyleType::Paragraph)
        .name(def.display_name)
        .based_on(def.based_on)
        .next(def.next)
        .size(def.size)
        .fonts(
            RunFonts::new()
                .ascii(&def.font)
                .hi_ansi(&def.font)
                .cs(&def.font),
        );

    if def.bold {
        style = style.bold();
    }
    if def.italic {
        style = style.italic();
    }
    if let Some(color) = def.color {
        style = style.color(color);
    }
    if let Some(spacing) = def.spacing {
        style = style.line_spacing(
            LineSpacing::new()
                .before(spacing.before)
                .after(spacing.after),
        );
    }

    style
}

fn create_abstract_numbering(def: &NumberingDef) -> AbstractNumbering {
    def.levels
        .iter()
        .fold(AbstractNumbering::new(def.id), |abstract_num, spec| {
            let level = Level::new(
                spec.level,
                Start::new(1),
                NumberFormat::new(spec.format.as_str()),
                LevelText::new(&spec.text),
                LevelJc::new("left"),
            )
            .indent(
                Some(spec.indent),
                Some(SpecialIndentType::Hanging(spec.hanging)),
                None,
                None,
            );
            abstract_num.add_level(level)
        })
}

/// Create a docx-rs paragraph with its list numbering and runs
fn create_paragraph(paragraph: &layout::Paragraph) -> Paragraph {
    let mut para = Paragraph::new().style(paragraph.style.id());

    if let Some(handle) = paragraph.numbering {
        para = para.numbering(NumberingId::new(handle.id), IndentLevel::new(handle.level));
    }

    for run in &paragraph.runs {
        para = para.add_run(create_run(run));
    }
    para
}

/// Create a docx-rs run with the run's character formatting
fn create_run(run: &layout::Run) -> Run {
    let mut out = Run::new().add_text(&run.text);

    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    if run.underline {
        out = out.underline("single");
    }
    // Run has no builder for vertical alignment; set it on the properties
    if run.superscript {
        out.run_property = out.run_property.vert_align(VertAlignType::SuperScript);
    } else if run.subscript {
        out.run_property = out.run_property.vert_align(VertAlignType::SubScript);
    }

    out
}

/// Create a table with equal-width columns
///
/// Merge regions become a `gridSpan` on their left column and a `vMerge`
/// chain down their rows; positions absorbed by a span emit no cell.
fn create_table(table: &OutputTable, config: &RenderConfig) -> Table {
    let col_width = config.content_width / table.cols().max(1);
    let mut rows = Vec::with_capacity(table.rows());

    for row in 0..table.rows() {
        let mut cells = Vec::new();
        let mut col = 0;

        while col < table.cols() {
            match table.merge_at(row, col).copied() {
                Some(merge) => {
                    let mut cell = if merge.row == row {
                        create_cell(table, row, merge.col, config)
                    } else {
                        TableCell::new().add_paragraph(Paragraph::new())
                    };
                    if merge.cols > 1 {
                        cell = cell.grid_span(merge.cols);
                    }
                    if merge.rows > 1 {
                        let merge_type = if merge.row == row {
                            VMergeType::Restart
                        } else {
                            VMergeType::Continue
                        };
                        cell = cell.vertical_merge(merge_type);
                    }
                    cells.push(cell.width(col_width * merge.cols, WidthType::Dxa));
                    col = merge.col + merge.cols;
                }
                None => {
                    let cell = create_cell(table, row, col, config);
                    cells.push(cell.width(col_width, WidthType::Dxa));
                    col += 1;
                }
            }
        }

        rows.push(TableRow::new(cells));
    }

    Table::new(rows).set_grid(vec![col_width; table.cols()])
}

/// Create a table cell from the blocks at a grid position
fn create_cell(table: &OutputTable, row: usize, col: usize, config: &RenderConfig) -> TableCell {
    let mut cell = TableCell::new();
    let mut ends_with_paragraph = false;

    for block in table.cell(row, col).map(|c| c.blocks.as_slice()).unwrap_or_default() {
        match block {
            Block::Paragraph(paragraph) => {
                cell = cell.add_paragraph(create_paragraph(paragraph));
                ends_with_paragraph = true;
            }
            Block::Table(nested) => {
                cell = cell.add_table(create_table(nested, config));
                ends_with_paragraph = false;
            }
            Block::Image(image) => {
                if let Some(paragraph) = create_image_paragraph(image, config) {
                    cell = cell.add_paragraph(paragraph);
                    ends_with_paragraph = true;
                }
            }
        }
    }

    // Word requires every cell to end with a paragraph
    if !ends_with_paragraph {
        cell = cell.add_paragraph(Paragraph::new());
    }
    cell
}

/// Create an image paragraph, or `None` if the image cannot be loaded
fn create_image_paragraph(image: &ImageBlock, config: &RenderConfig) -> Option<Paragraph> {
    let bytes = match load_image_source(&image.src) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to add image {}: {}", abbreviate(&image.src), e);
            return None;
        }
    };

    let natural = match imagesize::blob_size(&bytes) {
        Ok(size) if size.width > 0 && size.height > 0 => {
            let px = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
            Some((px(size.width), px(size.height)))
        }
        _ => {
            log::warn!("Skipping unreadable image {}", abbreviate(&image.src));
            return None;
        }
    };

    let (width_px, height_px) = image_size(image.width, image.height, natural, config);
    let pic = Pic::new(&bytes).size(
        width_px.saturating_mul(EMUS_PER_PIXEL),
        height_px.saturating_mul(EMUS_PER_PIXEL),
    );

    Some(
        Paragraph::new()
            .align(AlignmentType::Center)
            .add_run(Run::new().add_image(pic)),
    )
}

/// Final pixel size of an image
///
/// Explicit sizes win; a single explicit side keeps the natural aspect
/// ratio. The result never exceeds the configured maximum width.
fn image_size(
    width: Option<u32>,
    height: Option<u32>,
    natural: Option<(u32, u32)>,
    config: &RenderConfig,
) -> (u32, u32) {
    let scale = |value: u32, from: u32, to: u32| -> u32 {
        let scaled = u64::from(value) * u64::from(to) / u64::from(from.max(1));
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    };

    let (w, h) = match (width, height, natural) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((nw, nh))) => (w, scale(w, nw, nh)),
        (None, Some(h), Some((nw, nh))) => (scale(h, nh, nw), h),
        (None, None, Some(size)) => size,
        (Some(w), None, None) => (w, w * 2 / 3),
        (None, Some(h), None) => (h * 3 / 2, h),
        (None, None, None) => FALLBACK_IMAGE_SIZE,
    };

    let max = config.max_image_width_px.max(1);
    if w > max {
        (max, scale(h, w, max))
    } else {
        (w, h)
    }
}

/// Errors reading the bytes behind an image `src`
#[derive(Error, Debug)]
enum ImageSourceError {
    #[error("malformed data URI")]
    MalformedDataUri,

    #[error("only base64 data URIs are supported")]
    UnsupportedEncoding,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote images are not fetched")]
    Remote,
}

/// Read image bytes from a `data:` URI or a local path
fn load_image_source(src: &str) -> Result<Vec<u8>, ImageSourceError> {
    if let Some(rest) = src.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or(ImageSourceError::MalformedDataUri)?;
        if !meta.ends_with(";base64") {
            return Err(ImageSourceError::UnsupportedEncoding);
        }
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        return Ok(base64::engine::general_purpose::STANDARD.decode(cleaned)?);
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(ImageSourceError::Remote);
    }

    Ok(std::fs::read(Path::new(src))?)
}

/// Shorten long sources (data URIs) for log messages
fn abbreviate(src: &str) -> String {
    const MAX: usize = 60;
    match src.char_indices().nth(MAX) {
        Some((index, _)) => format!("{}...", &src[..index]),
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BlockContainer, Paragraph as ModelParagraph, Run as ModelRun};
    use crate::styles::StyleName;

    /// 1x1 transparent PNG
    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn encode(body: &OutputDocument) -> Vec<u8> {
        let config = RenderConfig::default();
        let styles = StyleRegistry::new(&config);
        let mut numbering = NumberingRegistry::new(&config);
        numbering.allocate(0);
        to_docx(body, &styles, &numbering, &config).unwrap()
    }

    #[test]
    fn test_output_is_zip_package() {
        let mut body = OutputDocument::new();
        let mut paragraph = ModelParagraph::new(StyleName::Body);
        let mut run = ModelRun::new("Hello");
        run.bold = true;
        run.superscript = true;
        paragraph.add_run(run);
        body.add_paragraph(paragraph);

        let bytes = encode(&body);
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_merged_table_encodes() {
        let mut table = OutputTable::new(3, 3);
        table.merge_vertical(0, 0, 2).unwrap();
        table.merge_horizontal(0, 1, 2).unwrap();
        table
            .cell_mut(0, 1)
            .unwrap()
            .add_paragraph(ModelParagraph::with_text(StyleName::Body, "value"));
        table
            .cell_mut(1, 1)
            .unwrap()
            .add_block(Block::Table(OutputTable::new(1, 1)));

        let mut body = OutputDocument::new();
        body.add_block(Block::Table(table));
        assert!(encode(&body).starts_with(b"PK"));
    }

    fn paragraph_with(text: &str, format: impl FnOnce(&mut ModelRun)) -> ModelParagraph {
        let mut run = ModelRun::new(text);
        format(&mut run);
        let mut paragraph = ModelParagraph::new(StyleName::Body);
        paragraph.add_run(run);
        paragraph
    }

    /// document.xml, numbering.xml and styles.xml of an encoded body
    fn xml_parts(body: &OutputDocument, numbering: &NumberingRegistry) -> (String, String, String) {
        let config = RenderConfig::default();
        let styles = StyleRegistry::new(&config);
        let xml = create_docx(body, &styles, numbering, &config).build();
        (
            String::from_utf8(xml.document).unwrap(),
            String::from_utf8(xml.numberings).unwrap(),
            String::from_utf8(xml.styles).unwrap(),
        )
    }

    fn has_empty_element(xml: &str, name: &str) -> bool {
        xml.contains(&format!("<{} />", name)) || xml.contains(&format!("<{}/>", name))
    }

    #[test]
    fn test_vertical_alignment_written() {
        let mut body = OutputDocument::new();
        body.add_paragraph(paragraph_with("2", |run| run.superscript = true));
        body.add_paragraph(paragraph_with("O", |run| run.subscript = true));

        let (document, _, _) = xml_parts(&body, &NumberingRegistry::new(&RenderConfig::default()));
        assert!(document.contains(r#"w:vertAlign w:val="superscript""#));
        assert!(document.contains(r#"w:vertAlign w:val="subscript""#));
    }

    #[test]
    fn test_bold_italic_underline_written() {
        let mut body = OutputDocument::new();
        body.add_paragraph(paragraph_with("strong", |run| {
            run.bold = true;
            run.italic = true;
            run.underline = true;
        }));

        let (document, _, _) = xml_parts(&body, &NumberingRegistry::new(&RenderConfig::default()));
        assert!(has_empty_element(&document, "w:b"));
        assert!(has_empty_element(&document, "w:i"));
        assert!(document.contains(r#"w:u w:val="single""#));
        assert!(document.contains(r#"w:pStyle w:val="body""#));
        assert!(!document.contains("w:vertAlign"));
    }

    #[test]
    fn test_widened_merge_written_as_grid_span_and_vmerge() {
        let mut table = OutputTable::new(2, 3);
        table.merge_vertical(0, 0, 1).unwrap();
        table.merge_horizontal(0, 0, 1).unwrap();

        let mut body = OutputDocument::new();
        body.add_block(Block::Table(table));

        let (document, _, _) = xml_parts(&body, &NumberingRegistry::new(&RenderConfig::default()));
        assert_eq!(document.matches(r#"w:gridSpan w:val="2""#).count(), 2);
        assert_eq!(document.matches(r#"w:vMerge w:val="restart""#).count(), 1);
        assert_eq!(document.matches(r#"w:vMerge w:val="continue""#).count(), 1);
    }

    #[test]
    fn test_numbered_paragraph_references_its_definition() {
        let config = RenderConfig::default();
        let mut numbering = NumberingRegistry::new(&config);
        numbering.allocate(0);
        let handle = numbering.allocate(1);

        let mut paragraph = ModelParagraph::with_text(StyleName::Body, "nested");
        paragraph.numbering = Some(handle);
        let mut body = OutputDocument::new();
        body.add_paragraph(paragraph);

        let (document, numberings, _) = xml_parts(&body, &numbering);
        assert!(document.contains(r#"w:numId w:val="3""#));
        assert!(document.contains(r#"w:ilvl w:val="1""#));
        assert!(numberings.contains(r#"w:lvlText w:val="%2.""#));
        assert!(numberings.contains(r#"w:numFmt w:val="decimal""#));
    }

    #[test]
    fn test_styles_registered_by_id() {
        let mut body = OutputDocument::new();
        body.add_paragraph(ModelParagraph::with_text(StyleName::Heading1, "Title"));

        let (document, _, styles) = xml_parts(&body, &NumberingRegistry::new(&RenderConfig::default()));
        assert!(document.contains(r#"w:pStyle w:val="Heading1""#));
        assert!(styles.contains(r#"w:styleId="Heading1""#));
        assert!(styles.contains(r#"w:styleId="aside""#));
    }

    #[test]
    fn test_load_data_uri() {
        let bytes = load_image_source(&format!("data:image/png;base64,{}", PIXEL_PNG)).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));

        assert!(matches!(
            load_image_source("data:image/png,raw"),
            Err(ImageSourceError::UnsupportedEncoding)
        ));
        assert!(matches!(
            load_image_source("data:image/png;base64"),
            Err(ImageSourceError::MalformedDataUri)
        ));
        assert!(matches!(
            load_image_source("https://example.com/a.png"),
            Err(ImageSourceError::Remote)
        ));
    }

    #[test]
    fn test_bad_image_is_skipped() {
        let config = RenderConfig::default();
        let missing = ImageBlock {
            src: "/nonexistent/figure.png".to_string(),
            width: Some(10),
            height: Some(10),
        };
        assert!(create_image_paragraph(&missing, &config).is_none());

        let garbage = ImageBlock {
            src: "data:image/png;base64,AAAA".to_string(),
            width: None,
            height: None,
        };
        assert!(create_image_paragraph(&garbage, &config).is_none());
    }

    #[test]
    fn test_image_size_rules() {
        let config = RenderConfig::default();
        assert_eq!(image_size(Some(300), Some(200), Some((1, 1)), &config), (300, 200));
        assert_eq!(image_size(Some(200), None, Some((400, 100)), &config), (200, 50));
        assert_eq!(image_size(None, None, Some((120, 80)), &config), (120, 80));
        assert_eq!(image_size(None, None, None, &config), FALLBACK_IMAGE_SIZE);
        // Clamped to the maximum width, aspect ratio kept
        assert_eq!(image_size(Some(1248), Some(400), None, &config), (624, 200));
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("short"), "short");
        assert_eq!(abbreviate(&"x".repeat(100)).len(), 63);
    }
}
