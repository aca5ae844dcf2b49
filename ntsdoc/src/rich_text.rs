//! Rich-text tree produced by the web form editor
//!
//! The editor stores each narrative field as a JSON document of the form
//! `{"document": {"nodes": [...]}}`. This module decodes that value into a
//! read-only [`Node`] tree which the renderer walks.

use serde::Deserialize;

// Submodules
mod leaf;
mod node;
mod number;

// Re-export public types
pub use leaf::{InlineText, Leaf, MarkType};
pub use node::{Node, NodeData, NodeKind};
pub use number::{LooseNumber, Span};

/// A decoded rich-text field
#[derive(Debug, Clone, Default)]
pub struct RichText {
    /// Top-level block nodes in document order
    pub nodes: Vec<Node>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EditorValue {
    document: EditorDocument,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EditorDocument {
    nodes: Vec<Node>,
}

impl RichText {
    /// Decode a serialized editor value
    ///
    /// Empty input yields an empty tree. Input that is not valid JSON, or not
    /// shaped like an editor value, is logged and also yields an empty tree:
    /// one broken field must not prevent the rest of the document from rendering.
    pub fn parse(value: &str) -> Self {
        if value.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<EditorValue>(value) {
            Ok(parsed) => Self {
                nodes: parsed.document.nodes,
            },
            Err(e) => {
                log::warn!("Ignoring unreadable rich-text value: {}", e);
                Self::default()
            }
        }
    }

    /// Decode an editor value that is already a JSON value
    ///
    /// Strings are treated as serialized values, objects as the value itself,
    /// anything else as empty.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Object(_) => match EditorValue::deserialize(value) {
                Ok(parsed) => Self {
                    nodes: parsed.document.nodes,
                },
                Err(e) => {
                    log::warn!("Ignoring unreadable rich-text value: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Whether the field holds no blocks at all
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every table node in the tree, depth first
    pub fn tables(&self) -> Vec<&Node> {
        let mut tables = Vec::new();
        for node in &self.nodes {
            collect_tables(node, &mut tables);
        }
        tables
    }
}

fn collect_tables<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if node.kind == NodeKind::Table {
        out.push(node);
    }
    for child in &node.nodes {
        collect_tables(child, out);
    }
}
