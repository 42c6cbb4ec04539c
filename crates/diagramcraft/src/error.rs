//! Error types for DiagramCraft operations.
//!
//! [`DiagramcraftError`] is what hosts see. The pipeline stages themselves
//! never return it: validation and rendering failures become
//! [`RenderOutcome`](crate::RenderOutcome) variants, and raster export
//! failures are [`ExportError`](crate::ExportError)s.

use std::io;

use thiserror::Error;

use diagramcraft_parser::ParseError;

use crate::{export::ExportError, generation::GenerationError};

/// The main error type for DiagramCraft operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the validated source next to the structured
/// diagnostics so hosts can print annotated source snippets.
#[derive(Debug, Error)]
pub enum DiagramcraftError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiagramcraftError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
