//! Leaves and character marks

use serde::{Deserialize, Deserializer};

/// A character-level formatting toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkType {
    Bold,
    Italic,
    Underline,
    Subscript,
    Superscript,
}

impl MarkType {
    /// Map an editor mark name to a mark, `None` for marks we do not render
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(MarkType::Bold),
            "italic" => Some(MarkType::Italic),
            "underlined" | "underline" => Some(MarkType::Underline),
            "subscript" => Some(MarkType::Subscript),
            "superscript" => Some(MarkType::Superscript),
            _ => None,
        }
    }
}

/// Editors have stored marks both as bare names and as `{"type": name}` objects
#[derive(Deserialize)]
#[serde(untagged)]
enum MarkRepr {
    Name(String),
    Object {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl MarkRepr {
    fn name(&self) -> &str {
        match self {
            MarkRepr::Name(name) => name,
            MarkRepr::Object { kind } => kind,
        }
    }
}

/// Deserialize a mark list, dropping marks with unknown names
pub(crate) fn deserialize_marks<'de, D>(deserializer: D) -> Result<Vec<MarkType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<MarkRepr>> = Option::deserialize(deserializer)?;
    let mut marks: Vec<MarkType> = Vec::new();
    for mark in raw.unwrap_or_default() {
        if let Some(mark) = MarkType::from_name(mark.name()) {
            if !marks.contains(&mark) {
                marks.push(mark);
            }
        }
    }
    Ok(marks)
}

/// Smallest unit of text, carrying its marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Leaf {
    pub text: String,
    #[serde(deserialize_with = "deserialize_marks")]
    pub marks: Vec<MarkType>,
}

/// A borrowed view of a leaf, whether it came from a `leaves` array or from
/// a text node that carries its text directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineText<'a> {
    pub text: &'a str,
    pub marks: &'a [MarkType],
}

impl<'a> From<&'a Leaf> for InlineText<'a> {
    fn from(leaf: &'a Leaf) -> Self {
        Self {
            text: &leaf.text,
            marks: &leaf.marks,
        }
    }
}
