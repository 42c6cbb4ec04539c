//! Pipeline outcomes and the snapshots that publish them.

use std::{fmt, sync::Arc};

use thiserror::Error;

use diagramcraft_parser::ParseError;

use crate::description::Version;

/// A description that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
    diagnostics: Option<Arc<ParseError>>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diagnostics: None,
        }
    }

    /// Keep the validator's diagnostics; the message locates the first error in `source`.
    pub fn from_parse(err: ParseError, source: &str) -> Self {
        Self {
            message: err.describe(source),
            diagnostics: Some(Arc::new(err)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn diagnostics(&self) -> Option<&ParseError> {
        self.diagnostics.as_deref()
    }
}

/// A valid description that the engine failed to draw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Validation or rendering is still in flight.
    Pending,
    Rendered { svg: Arc<str> },
    /// A text document shown as read-only text.
    DocumentPreview { text: Arc<str> },
    SyntaxError(SyntaxError),
    RenderError(RenderError),
}

impl RenderOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, RenderOutcome::Pending)
    }

    pub fn svg(&self) -> Option<&str> {
        match self {
            RenderOutcome::Rendered { svg } => Some(svg),
            _ => None,
        }
    }

    /// Message of a syntax or render error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RenderOutcome::SyntaxError(err) => Some(err.message()),
            RenderOutcome::RenderError(err) => Some(err.message()),
            _ => None,
        }
    }
}

/// Where a snapshot sits in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing to show: the buffer is empty.
    Idle,
    Validating,
    Rendering,
    Rendered,
    DocumentPreview,
    SyntaxError,
    RenderError,
}

impl Stage {
    /// `true` once the run for the snapshot's version has finished.
    pub fn is_settled(self) -> bool {
        !matches!(self, Stage::Validating | Stage::Rendering)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::Rendering => "rendering",
            Stage::Rendered => "rendered",
            Stage::DocumentPreview => "document preview",
            Stage::SyntaxError => "syntax error",
            Stage::RenderError => "render error",
        };
        f.write_str(name)
    }
}

/// The current outcome together with the buffer version it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    version: Version,
    stage: Stage,
    outcome: Option<RenderOutcome>,
}

impl Snapshot {
    pub(crate) fn new(version: Version, stage: Stage, outcome: Option<RenderOutcome>) -> Self {
        Self {
            version,
            stage,
            outcome,
        }
    }

    pub(crate) fn idle() -> Self {
        Self::new(Version::INITIAL, Stage::Idle, None)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// `None` while the buffer is empty.
    pub fn outcome(&self) -> Option<&RenderOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_settled(&self) -> bool {
        self.stage.is_settled()
    }
}
