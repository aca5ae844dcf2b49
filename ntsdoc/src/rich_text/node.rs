//! Block and inline nodes of the editor tree

use super::leaf::{deserialize_marks, InlineText, Leaf, MarkType};
use super::number::{LooseNumber, Span};
use itertools::Itertools;
use serde::Deserialize;

/// The node's `type` tag
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum NodeKind {
    Heading1,
    Heading2,
    Quote,
    Paragraph,
    BulletedList,
    NumberedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Image,
    /// No tag at all: a text node
    #[default]
    Text,
    /// A tag this renderer does not know about
    Unknown(String),
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "heading-one" => NodeKind::Heading1,
            "heading-two" => NodeKind::Heading2,
            "block-quote" => NodeKind::Quote,
            "paragraph" | "block" => NodeKind::Paragraph,
            "bulleted-list" => NodeKind::BulletedList,
            "numbered-list" => NodeKind::NumberedList,
            "list-item" => NodeKind::ListItem,
            "table" => NodeKind::Table,
            "table-row" => NodeKind::TableRow,
            "table-cell" => NodeKind::TableCell,
            "image" => NodeKind::Image,
            _ => NodeKind::Unknown(tag),
        }
    }
}

/// Free-form attributes the editor attaches to a node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeData {
    pub row_span: Option<LooseNumber>,
    pub col_span: Option<LooseNumber>,
    pub src: Option<String>,
    pub width: Option<LooseNumber>,
    pub height: Option<LooseNumber>,
}

/// A node of the rich-text tree
///
/// Container nodes carry `nodes`; text nodes carry either `leaves` or a
/// direct `text` (with `marks`), depending on the editor version that saved it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub nodes: Vec<Node>,
    pub leaves: Vec<Leaf>,
    pub text: Option<String>,
    #[serde(deserialize_with = "deserialize_marks")]
    pub marks: Vec<MarkType>,
    pub data: NodeData,
}

impl Node {
    /// Create a container node of the given kind
    pub fn block(kind: NodeKind, nodes: Vec<Node>) -> Self {
        Self {
            kind,
            nodes,
            ..Default::default()
        }
    }

    /// Create a text node carrying a single leaf
    pub fn text(text: impl Into<String>, marks: Vec<MarkType>) -> Self {
        Self {
            kind: NodeKind::Text,
            leaves: vec![Leaf {
                text: text.into(),
                marks,
            }],
            ..Default::default()
        }
    }

    /// Declared row span of a table cell
    pub fn row_span(&self) -> Span {
        Span::from_declared(self.data.row_span.as_ref())
    }

    /// Declared column span of a table cell
    pub fn col_span(&self) -> Span {
        Span::from_declared(self.data.col_span.as_ref())
    }

    /// Whether this node holds inline content of its own rather than children
    pub fn has_own_text(&self) -> bool {
        self.text.is_some() || !self.leaves.is_empty()
    }

    /// The inline pieces this node contributes to a paragraph
    ///
    /// A text node yields its leaves, or itself when it stores its text
    /// directly. Inline wrappers (links and the like) yield the pieces of
    /// their children.
    pub fn inline_texts(&self) -> Vec<InlineText<'_>> {
        let mut out = Vec::new();
        self.collect_inline_texts(&mut out);
        out
    }

    fn collect_inline_texts<'a>(&'a self, out: &mut Vec<InlineText<'a>>) {
        if !self.leaves.is_empty() {
            out.extend(self.leaves.iter().map(InlineText::from));
        } else if let Some(text) = &self.text {
            out.push(InlineText {
                text,
                marks: &self.marks,
            });
        } else {
            for child in &self.nodes {
                child.collect_inline_texts(out);
            }
        }
    }

    /// Text of a heading-like block: the first child's first leaf, falling
    /// back to the first child's own text, then to all of its text
    pub fn first_leaf_text(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return self.text.clone().unwrap_or_default();
        };

        if let Some(leaf) = first.leaves.first() {
            return leaf.text.clone();
        }
        if let Some(text) = &first.text {
            return text.clone();
        }
        first.inline_texts().iter().map(|t| t.text).join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_tags() {
        let node: Node = serde_json::from_str(r#"{"type": "block-quote"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Quote);

        let node: Node = serde_json::from_str(r#"{"type": "block"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Paragraph);

        let node: Node = serde_json::from_str(r#"{"object": "text", "text": "x"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Text);

        let node: Node = serde_json::from_str(r#"{"type": "code"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Unknown("code".to_string()));
    }

    #[test]
    fn test_cell_spans_from_data() {
        let cell: Node = serde_json::from_str(
            r#"{"type": "table-cell", "data": {"rowSpan": "0", "colSpan": 2}}"#,
        )
        .unwrap();

        assert_eq!(cell.row_span(), Span::ToEnd);
        assert_eq!(cell.col_span(), Span::Count(2));

        let plain: Node = serde_json::from_str(r#"{"type": "table-cell"}"#).unwrap();
        assert_eq!(plain.row_span(), Span::Count(1));
        assert_eq!(plain.col_span(), Span::Count(1));
    }

    #[test]
    fn test_inline_texts_through_wrappers() {
        let paragraph: Node = serde_json::from_str(
            r#"{"type": "paragraph", "nodes": [
                {"object": "text", "leaves": [{"text": "See "}]},
                {"object": "inline", "type": "link", "nodes": [
                    {"object": "text", "text": "here", "marks": ["underlined"]}
                ]}
            ]}"#,
        )
        .unwrap();

        let texts: Vec<InlineText<'_>> = paragraph
            .nodes
            .iter()
            .flat_map(|child| child.inline_texts())
            .collect();

        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].text, "See ");
        assert_eq!(texts[1].text, "here");
        assert_eq!(texts[1].marks, &[MarkType::Underline]);
    }

    #[test]
    fn test_first_leaf_text_fallbacks() {
        let leaves: Node = serde_json::from_str(
            r#"{"type": "heading-one", "nodes": [{"leaves": [{"text": " Aims "}, {"text": "ignored"}]}]}"#,
        )
        .unwrap();
        assert_eq!(leaves.first_leaf_text(), " Aims ");

        let direct: Node =
            serde_json::from_str(r#"{"type": "heading-two", "nodes": [{"text": "Benefits"}]}"#)
                .unwrap();
        assert_eq!(direct.first_leaf_text(), "Benefits");

        let nested: Node = serde_json::from_str(
            r#"{"type": "block-quote", "nodes": [{"type": "paragraph", "nodes": [
                {"text": "Quoted "}, {"text": "words"}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(nested.first_leaf_text(), "Quoted words");

        let empty = Node::block(NodeKind::Heading1, Vec::new());
        assert_eq!(empty.first_leaf_text(), "");
    }
}
