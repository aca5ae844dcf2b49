//! List numbering definitions allocated while rendering
//!
//! Every numbered list gets its own definition so that numbering restarts
//! at 1 for each list. Bulleted lists share one definition, created the
//! first time a bullet is needed.

use crate::render_config::RenderConfig;

/// First id handed out; id 1 is left to the writer's built-in numbering
const FIRST_NUMBERING_ID: usize = 2;

/// Deepest level a word processor list supports (levels are 0-based)
pub const MAX_LEVEL: usize = 8;

/// Reference from a paragraph to a numbering definition and level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingHandle {
    pub id: usize,
    pub level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    Decimal,
    Bullet,
}

impl LevelFormat {
    /// Format name as written into the document
    pub fn as_str(self) -> &'static str {
        match self {
            LevelFormat::Decimal => "decimal",
            LevelFormat::Bullet => "bullet",
        }
    }
}

/// Formatting of one nesting depth of a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSpec {
    pub level: usize,
    pub format: LevelFormat,
    /// Marker template, e.g. `%1.` or `•`
    pub text: String,
    /// Left indent in twips
    pub indent: i32,
    /// Hanging indent of the marker in twips
    pub hanging: i32,
}

/// A numbering definition and its levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingDef {
    pub id: usize,
    pub levels: Vec<LevelSpec>,
}

/// Numbering definitions of one document build
#[derive(Debug, Clone)]
pub struct NumberingRegistry {
    indent_step: i32,
    definitions: Vec<NumberingDef>,
    bullet_id: Option<usize>,
}

impl NumberingRegistry {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            indent_step: config.list_indent,
            definitions: Vec::new(),
            bullet_id: None,
        }
    }

    /// Create a fresh decimal definition for a numbered list at `depth`
    pub fn allocate(&mut self, depth: usize) -> NumberingHandle {
        let level = depth.min(MAX_LEVEL);
        let id = self.next_id();
        let spec = self.level_spec(level, LevelFormat::Decimal);
        self.definitions.push(NumberingDef {
            id,
            levels: vec![spec],
        });
        log::debug!("Allocated numbering {} at level {}", id, level);
        NumberingHandle { id, level }
    }

    /// Handle for a bulleted item at `depth`, sharing one definition
    pub fn bullet(&mut self, depth: usize) -> NumberingHandle {
        let level = depth.min(MAX_LEVEL);
        let id = match self.bullet_id {
            Some(id) => id,
            None => {
                let id = self.next_id();
                let levels: Vec<LevelSpec> = (0..=MAX_LEVEL)
                    .map(|l| self.level_spec(l, LevelFormat::Bullet))
                    .collect();
                self.definitions.push(NumberingDef { id, levels });
                self.bullet_id = Some(id);
                id
            }
        };
        NumberingHandle { id, level }
    }

    /// Look up a definition by id
    pub fn get(&self, id: usize) -> Option<&NumberingDef> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// All definitions in allocation order
    pub fn definitions(&self) -> &[NumberingDef] {
        &self.definitions
    }

    fn next_id(&self) -> usize {
        FIRST_NUMBERING_ID + self.definitions.len()
    }

    fn level_spec(&self, level: usize, format: LevelFormat) -> LevelSpec {
        let text = match format {
            LevelFormat::Decimal => format!("%{}.", level + 1),
            LevelFormat::Bullet => "\u{2022}".to_string(),
        };
        let depth = i32::try_from(level).unwrap_or(i32::MAX);
        LevelSpec {
            level,
            format,
            text,
            indent: self.indent_step.saturating_mul(depth.saturating_add(1)),
            hanging: self.indent_step / 2,
        }
    }
}
