//! Errors surfaced by a document build

use thiserror::Error;

/// Errors that fail a whole build
///
/// Problems with the input tree or table layout never show up here; they are
/// absorbed while rendering and logged instead.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Encoding the document into bytes failed
    #[error("Failed to serialize document: {0}")]
    Serialization(String),
}
