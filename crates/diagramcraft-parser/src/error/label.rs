//! Source spans annotated with a short message.

use crate::span::Span;

/// A labelled span inside a diagnostic.
///
/// The primary label points at the offending text ("dangling connection");
/// secondary labels point at related places ("block opened here").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kinds() {
        let primary = Label::primary(Span::new(4..9), "dangling connection");
        let secondary = Label::secondary(Span::new(0..8), "subgraph opened here");

        assert!(primary.is_primary());
        assert!(!secondary.is_primary());
        assert_eq!(primary.span().len(), 5);
        assert_eq!(secondary.message(), "subgraph opened here");
    }
}
