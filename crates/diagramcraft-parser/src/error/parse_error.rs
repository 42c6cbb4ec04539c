use std::fmt;

use crate::error::Diagnostic;

/// One or more diagnostics that made a description invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The first error-severity diagnostic.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|diag| diag.severity().is_error())
    }

    /// Human readable message including the `line:column` of the first error.
    pub fn describe(&self, source: &str) -> String {
        let Some(first) = self.first_error() else {
            return self.to_string();
        };
        let mut message = first.to_string();
        if let Some(span) = first.primary_span() {
            let (line, column) = span.line_col(source);
            message.push_str(&format!(" (line {line}, column {column})"));
        }
        let errors = self
            .diagnostics
            .iter()
            .filter(|diag| diag.severity().is_error())
            .count();
        if errors > 1 {
            message.push_str(&format!(" (+{} more)", errors - 1));
        }
        message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_display_counts_extra_diagnostics() {
        let err: ParseError = vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
            Diagnostic::warning("third"),
        ]
        .into();

        assert_eq!(err.to_string(), "error: first (+2 more)");
    }

    #[test]
    fn test_describe_adds_location() {
        let source = "graph TD\nA-->";
        let err: ParseError = Diagnostic::error("connection `-->` has no target node")
            .with_code(ErrorCode::E103)
            .with_label(Span::new(10..13), "dangling connection")
            .into();

        assert_eq!(
            err.describe(source),
            "error[E103]: connection `-->` has no target node (line 2, column 2)"
        );
    }

    #[test]
    fn test_describe_skips_leading_warning() {
        let err: ParseError = vec![
            Diagnostic::warning("ignored"),
            Diagnostic::error("real problem"),
        ]
        .into();

        assert_eq!(err.describe(""), "error: real problem");
    }
}
