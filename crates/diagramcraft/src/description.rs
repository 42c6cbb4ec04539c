//! The versioned description buffer.

use std::{fmt, sync::Arc};

use diagramcraft_parser::{DescriptionKind, classify};

use crate::catalog::DiagramKind;

/// Monotonic buffer version; every edit or replacement takes the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(u64);

impl Version {
    /// The version of a session's initial, empty buffer.
    pub const INITIAL: Version = Version(0);

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Version(value)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One immutable version of the diagram source.
///
/// A new description supersedes the previous one; descriptions are never
/// changed in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramDescription {
    text: Arc<str>,
    kind: DescriptionKind,
    version: Version,
    hint: Option<DiagramKind>,
}

impl DiagramDescription {
    /// Classify `text` and wrap it as `version`.
    pub fn new(text: impl Into<Arc<str>>, version: Version, hint: Option<DiagramKind>) -> Self {
        let text = text.into();
        let kind = classify(&text);
        Self {
            text,
            kind,
            version,
            hint,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new("", Version::INITIAL, None)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn kind(&self) -> DescriptionKind {
        self.kind
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The diagram kind the description was generated for, if known.
    pub fn hint(&self) -> Option<DiagramKind> {
        self.hint
    }

    /// Whitespace-only descriptions count as empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_ordered() {
        let first = Version::INITIAL.next();
        let second = first.next();

        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(second.to_string(), "v2");
    }

    #[test]
    fn test_description_is_classified() {
        let dsl = DiagramDescription::new("graph TD\nA-->B", Version::from(1), None);
        assert_eq!(dsl.kind(), DescriptionKind::Dsl);

        let document = DiagramDescription::new(
            "\\documentclass{standalone}",
            Version::from(2),
            Some(DiagramKind::Tikz),
        );
        assert_eq!(document.kind(), DescriptionKind::Document);
        assert_eq!(document.hint(), Some(DiagramKind::Tikz));
    }

    #[test]
    fn test_whitespace_is_empty() {
        assert!(DiagramDescription::empty().is_empty());
        assert!(DiagramDescription::new(" \n\t", Version::from(3), None).is_empty());
    }
}
