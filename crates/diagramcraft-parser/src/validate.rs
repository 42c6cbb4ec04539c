//! Syntax validation for Mermaid descriptions.
//!
//! Validation runs in two steps: the header selects a [`Dialect`], then the
//! dialect's checker walks the statement lines, emitting every problem it
//! finds into a [`DiagnosticCollector`]. Statements are checked independently
//! so one bad line does not hide problems on later lines.

mod blocks;
mod class;
mod er;
mod flowchart;
mod gantt;
mod git;
mod journey;
mod mindmap;
mod pie;
mod sequence;
mod state;

use log::debug;

use crate::{
    dialect::{Dialect, parse_header},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lines::{Line, statement_lines},
    span::Span,
};

pub(crate) use blocks::Blocks;

/// Summary of a description that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedDiagram {
    dialect: Dialect,
    statements: usize,
}

impl ValidatedDiagram {
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Number of statements after the header.
    pub fn statement_count(&self) -> usize {
        self.statements
    }
}

/// Check that `source` is a well-formed diagram description.
///
/// Returns every diagnostic found when any of them is an error.
///
/// # Examples
///
/// ```
/// use diagramcraft_parser::{error::ErrorCode, validate};
///
/// let diagram = validate("graph TD\nA-->B").unwrap();
/// assert_eq!(diagram.statement_count(), 1);
///
/// let err = validate("graph TD\nA-->").unwrap_err();
/// assert_eq!(err.first_error().and_then(|d| d.code()), Some(ErrorCode::E103));
/// ```
pub fn validate(source: &str) -> Result<ValidatedDiagram, ParseError> {
    let mut diagnostics = DiagnosticCollector::new();
    let lines = statement_lines(source, &mut diagnostics);

    let Some((first, body)) = lines.split_first() else {
        if !diagnostics.has_errors() {
            diagnostics.emit(
                Diagnostic::error("description is empty")
                    .with_code(ErrorCode::E100)
                    .with_label(Span::new(0..source.len()), "expected a diagram header")
                    .with_help("start the description with a header such as `graph TD`"),
            );
        }
        return Err(finish_err(diagnostics));
    };

    let header = match parse_header(first) {
        Ok(header) => header,
        Err(diagnostic) => {
            diagnostics.emit(diagnostic);
            return Err(finish_err(diagnostics));
        }
    };

    let mut statements: Vec<Line<'_>> = Vec::with_capacity(body.len() + 1);
    statements.extend(header.rest);
    statements.extend_from_slice(body);

    let dialect = header.dialect;
    debug!(dialect:% = dialect, lines = statements.len(); "Validating description");

    let count = match dialect {
        Dialect::Flowchart { .. } => flowchart::check(&statements, &mut diagnostics),
        Dialect::Sequence => sequence::check(&statements, &mut diagnostics),
        Dialect::Class => class::check(&statements, &mut diagnostics),
        Dialect::State => state::check(&statements, &mut diagnostics),
        Dialect::EntityRelationship => er::check(&statements, &mut diagnostics),
        Dialect::Gantt => gantt::check(&statements, &mut diagnostics),
        Dialect::Pie => pie::check(&statements, &mut diagnostics),
        Dialect::Journey => journey::check(&statements, &mut diagnostics),
        Dialect::Mindmap => mindmap::check(&statements, &mut diagnostics),
        Dialect::GitGraph => git::check(&statements, &mut diagnostics),
    };

    diagnostics.finish()?;
    Ok(ValidatedDiagram {
        dialect,
        statements: count,
    })
}

/// The dialect named by the description's header, without checking the body.
///
/// ```
/// use diagramcraft_parser::{Dialect, detect_dialect};
///
/// assert_eq!(detect_dialect("%% note\npie title Pets"), Some(Dialect::Pie));
/// assert_eq!(detect_dialect("A-->B"), None);
/// ```
pub fn detect_dialect(source: &str) -> Option<Dialect> {
    let mut diagnostics = DiagnosticCollector::new();
    let lines = statement_lines(source, &mut diagnostics);
    let first = lines.first()?;
    parse_header(first).ok().map(|header| header.dialect)
}

fn finish_err(diagnostics: DiagnosticCollector) -> ParseError {
    match diagnostics.finish() {
        Err(err) => err,
        Ok(()) => ParseError::from(Diagnostic::error("description is not valid")),
    }
}

/// Diagnostic for a statement that fits no form of the dialect.
pub(crate) fn unrecognized(line: &Line<'_>, help: &'static str) -> Diagnostic {
    Diagnostic::error(format!("unrecognized statement `{}`", line.text))
        .with_code(ErrorCode::E105)
        .with_label(line.span(), ErrorCode::E105.description())
        .with_help(help)
}

/// Diagnostic for a statement missing its `: text` part.
pub(crate) fn missing_text(line: &Line<'_>, what: &str, help: &'static str) -> Diagnostic {
    Diagnostic::error(format!("{what} is missing its text"))
        .with_code(ErrorCode::E109)
        .with_label(line.span(), ErrorCode::E109.description())
        .with_help(help)
}
