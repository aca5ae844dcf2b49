//! Named paragraph styles used by the summary document
//!
//! The set is fixed: styles are created once per build from the
//! configuration and looked up by [`StyleName`] afterwards.

use crate::render_config::RenderConfig;

/// Identifier of a registered paragraph style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    Heading1,
    Heading2,
    Heading3,
    Body,
    ListParagraph,
    Aside,
}

impl StyleName {
    /// Every style, in registration order
    pub const ALL: [StyleName; 6] = [
        StyleName::Heading1,
        StyleName::Heading2,
        StyleName::Heading3,
        StyleName::Body,
        StyleName::ListParagraph,
        StyleName::Aside,
    ];

    /// Style id as written into the document
    pub fn id(self) -> &'static str {
        match self {
            StyleName::Heading1 => "Heading1",
            StyleName::Heading2 => "Heading2",
            StyleName::Heading3 => "Heading3",
            StyleName::Body => "body",
            StyleName::ListParagraph => "ListParagraph",
            StyleName::Aside => "aside",
        }
    }
}

/// Spacing before and after a paragraph, in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacing {
    pub before: u32,
    pub after: u32,
}

/// An immutable style definition
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDef {
    pub name: StyleName,
    /// Display name shown in the word processor's style gallery
    pub display_name: &'static str,
    /// Id of the style this one inherits from
    pub based_on: &'static str,
    /// Id of the style used for the paragraph that follows
    pub next: &'static str,
    pub font: String,
    /// Size in half-points
    pub size: usize,
    pub bold: bool,
    pub italic: bool,
    /// Hex RGB without the leading `#`
    pub color: Option<&'static str>,
    /// `None` inherits the base style's spacing
    pub spacing: Option<Spacing>,
}

/// The styles registered for one document build
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<StyleDef>,
}

impl StyleRegistry {
    /// Build the standard style set using the configured font
    pub fn new(config: &RenderConfig) -> Self {
        let font = &config.font_family;
        let def = |name, display_name, size, bold, spacing: Option<(u32, u32)>| StyleDef {
            name,
            display_name,
            based_on: "Normal",
            next: "Normal",
            font: font.clone(),
            size,
            bold,
            italic: false,
            color: None,
            spacing: spacing.map(|(before, after)| Spacing { before, after }),
        };

        let styles = vec![
            def(StyleName::Heading1, "Heading 1", 36, true, Some((360, 400))),
            def(StyleName::Heading2, "Heading 2", 24, true, Some((200, 200))),
            def(StyleName::Heading3, "Heading 3", 28, true, Some((400, 200))),
            def(StyleName::Body, "Body", 24, false, Some((200, 200))),
            def(
                StyleName::ListParagraph,
                "List Paragraph",
                24,
                false,
                Some((100, 100)),
            ),
            StyleDef {
                based_on: StyleName::Body.id(),
                next: StyleName::Body.id(),
                italic: true,
                color: Some("999999"),
                ..def(StyleName::Aside, "Aside", 24, false, None)
            },
        ];

        Self { styles }
    }

    /// Look up a style definition
    pub fn get(&self, name: StyleName) -> &StyleDef {
        // `new` registers every name in declaration order
        &self.styles[name as usize]
    }

    /// All styles in registration order
    pub fn iter(&self) -> impl Iterator<Item = &StyleDef> {
        self.styles.iter()
    }
}
