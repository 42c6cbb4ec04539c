//! Description classification.
//!
//! A generated description is either a Mermaid document that the validator
//! and renderer understand, or a typeset text document (a LaTeX/TikZ
//! preamble) that can only be shown as read-only text.

use std::fmt;

/// Preamble markers that identify a text document.
///
/// Matched against the start of the description after leading whitespace.
pub const DOCUMENT_MARKERS: &[&str] = &[
    "\\documentclass",
    "\\usepackage",
    "\\begin{document}",
    "\\begin{tikzpicture}",
];

/// The rendering strategy a description needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptionKind {
    /// Mermaid diagram source.
    Dsl,
    /// Read-only text document.
    Document,
}

impl DescriptionKind {
    pub fn is_dsl(self) -> bool {
        matches!(self, DescriptionKind::Dsl)
    }

    pub fn is_document(self) -> bool {
        matches!(self, DescriptionKind::Document)
    }
}

impl fmt::Display for DescriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionKind::Dsl => f.write_str("dsl"),
            DescriptionKind::Document => f.write_str("document"),
        }
    }
}

/// Decide how `text` must be rendered.
///
/// Total and pure: every input, including the empty string, classifies.
///
/// # Examples
///
/// ```
/// use diagramcraft_parser::{DescriptionKind, classify};
///
/// assert_eq!(classify("graph TD\nA-->B"), DescriptionKind::Dsl);
/// assert_eq!(
///     classify("  \\documentclass{standalone}\n\\begin{document}"),
///     DescriptionKind::Document
/// );
/// ```
pub fn classify(text: &str) -> DescriptionKind {
    let head = text.trim_start();
    if DOCUMENT_MARKERS
        .iter()
        .any(|marker| head.starts_with(marker))
    {
        DescriptionKind::Document
    } else {
        DescriptionKind::Dsl
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_mermaid_is_dsl() {
        assert_eq!(classify("graph TD\nA-->B"), DescriptionKind::Dsl);
        assert_eq!(classify("sequenceDiagram"), DescriptionKind::Dsl);
    }

    #[test]
    fn test_preamble_after_whitespace_is_document() {
        assert_eq!(
            classify("\n\t \\documentclass{standalone}"),
            DescriptionKind::Document
        );
        assert_eq!(
            classify("\\begin{tikzpicture}\n\\end{tikzpicture}"),
            DescriptionKind::Document
        );
    }

    #[test]
    fn test_marker_must_lead() {
        assert_eq!(
            classify("graph TD\n%% \\documentclass is only a comment here"),
            DescriptionKind::Dsl
        );
    }

    #[test]
    fn test_empty_is_dsl() {
        assert_eq!(classify(""), DescriptionKind::Dsl);
        assert_eq!(classify("   "), DescriptionKind::Dsl);
    }

    proptest! {
        #[test]
        fn classify_is_idempotent(text in ".*") {
            prop_assert_eq!(classify(&text), classify(&text));
        }

        #[test]
        fn leading_whitespace_never_changes_kind(text in ".*", pad in "[ \t\n]{0,8}") {
            let padded = format!("{pad}{text}");
            prop_assert_eq!(classify(&padded), classify(&text));
        }
    }
}
