//! Project record supplied by the web application

use crate::rich_text::{LooseNumber, RichText};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A project and the answers captured by its summary form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub project: ProjectMeta,
    pub data: ProjectData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectMeta {
    pub title: Option<String>,
}

/// Form answers
///
/// Fields not modelled explicitly (the narrative sections, `purpose-b`, and
/// anything else the form stores) are kept as raw JSON in `fields`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    #[serde(deserialize_with = "null_as_default")]
    pub purpose: Vec<String>,
    pub duration: Option<Duration>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Expected duration of the project
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Duration {
    pub years: Option<LooseNumber>,
    pub months: Option<LooseNumber>,
}

/// The free-text sections of the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeField {
    Objectives,
    Benefits,
    Numbers,
    AdverseEffects,
    Replacement,
    Reduction,
    Refinement,
}

impl NarrativeField {
    pub const ALL: [NarrativeField; 7] = [
        NarrativeField::Objectives,
        NarrativeField::Benefits,
        NarrativeField::Numbers,
        NarrativeField::AdverseEffects,
        NarrativeField::Replacement,
        NarrativeField::Reduction,
        NarrativeField::Refinement,
    ];

    /// Key of the field in the form data
    pub fn key(self) -> &'static str {
        match self {
            NarrativeField::Objectives => "nts-objectives",
            NarrativeField::Benefits => "nts-benefits",
            NarrativeField::Numbers => "nts-numbers",
            NarrativeField::AdverseEffects => "nts-adverse-effects",
            NarrativeField::Replacement => "nts-replacement",
            NarrativeField::Reduction => "nts-reduction",
            NarrativeField::Refinement => "nts-refinement",
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProjectRecord {
    /// Parse a project record from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn title(&self) -> &str {
        self.project.title.as_deref().unwrap_or_default()
    }
}

impl ProjectData {
    /// Decoded rich text of a narrative section, empty when absent
    pub fn narrative(&self, field: NarrativeField) -> RichText {
        self.fields
            .get(field.key())
            .map(RichText::from_json)
            .unwrap_or_default()
    }

    /// Whether the project declares purpose `letter` (`'a'` to `'g'`)
    ///
    /// Purpose (b) is recorded in its own field listing the sub-purposes, so
    /// it counts as declared when that field holds anything.
    pub fn has_purpose(&self, letter: char) -> bool {
        if letter == 'b' {
            return self.fields.get("purpose-b").is_some_and(is_present);
        }
        let wanted = format!("purpose-{}", letter);
        self.purpose.iter().any(|p| *p == wanted)
    }
}

fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}

impl Duration {
    /// Human readable duration, e.g. `5 Years 1 Month`
    pub fn describe(&self) -> String {
        let years = self.years.as_ref().and_then(LooseNumber::as_int).unwrap_or(0);
        let months = self.months.as_ref().and_then(LooseNumber::as_int).unwrap_or(0);
        format!(
            "{} {} {} {}",
            years,
            if years == 1 { "Year" } else { "Years" },
            months,
            if months == 1 { "Month" } else { "Months" }
        )
    }
}
