//! ntsdoc - Non-technical summary document generator
//!
//! Renders the rich-text answers of a project record into a DOCX summary
//! form. The pipeline has three stages:
//!
//! 1. Decode: [`ProjectRecord`] and [`RichText`] read the editor's JSON
//! 2. Lay out: [`Renderer`] walks each tree into [`layout`] blocks, with
//!    tables normalized by [`matrix::normalize`] first
//! 3. Encode: [`docx_writer`] packs the laid-out document

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod docx_writer;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod numbering;
pub mod project;
pub mod render;
pub mod render_config;
pub mod rich_text;
pub mod sanitize;
pub mod styles;
pub mod summary;

pub use error::BuildError;
pub use project::{NarrativeField, ProjectRecord};
pub use render::Renderer;
pub use render_config::{ConfigError, RenderConfig};
pub use rich_text::RichText;
pub use summary::{build_summary, summary_document, SummaryDocument};
