//! Splitting a description into logical statement lines.

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
};

/// One non-blank, non-comment source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// One-based line number in the source.
    pub number: usize,
    /// Byte offset of `text` in the source.
    pub offset: usize,
    /// Line content with surrounding whitespace removed.
    pub text: &'a str,
    /// Width of the leading whitespace; tabs count as four columns.
    pub indent: usize,
}

impl<'a> Line<'a> {
    pub fn span(&self) -> Span {
        Span::new(self.offset..self.offset + self.text.len())
    }

    /// Span of `part`, which must be a subslice of `self.text`.
    pub fn span_of(&self, part: &str) -> Span {
        let start = (part.as_ptr() as usize).saturating_sub(self.text.as_ptr() as usize);
        Span::new(start..start + part.len()).shift(self.offset)
    }

    /// A line made of `text[start..]`, keeping document offsets.
    pub fn tail(&self, start: usize) -> Line<'a> {
        let rest = &self.text[start..];
        let trimmed = rest.trim_start();
        let skipped = rest.len() - trimmed.len();
        Line {
            number: self.number,
            offset: self.offset + start + skipped,
            text: trimmed.trim_end(),
            indent: self.indent,
        }
    }
}

/// Yield the statement lines of `source`.
///
/// Blank lines, `%%` comments and `%%{ .. }%%` directives are dropped. A YAML
/// front-matter block (`---` .. `---`) before the header is skipped; if it is
/// never closed an `E106` diagnostic is emitted and nothing after it is
/// returned.
pub(crate) fn statement_lines<'a>(
    source: &'a str,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let mut front_matter: Option<Span> = None;
    let mut seen_content = false;
    let mut offset = 0usize;

    for (index, raw) in source.split('\n').enumerate() {
        let line_start = offset;
        offset += raw.len() + 1;

        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        let leading = &raw[..raw.len() - raw.trim_start().len()];
        let text_offset = line_start + leading.len();

        if front_matter.is_some() {
            if text == "---" {
                front_matter = None;
            }
            continue;
        }
        if !seen_content && text == "---" {
            front_matter = Some(Span::new(text_offset..text_offset + 3));
            continue;
        }
        if text.starts_with("%%") {
            continue;
        }

        seen_content = true;
        lines.push(Line {
            number: index + 1,
            offset: text_offset,
            text,
            indent: leading
                .chars()
                .map(|c| if c == '\t' { 4 } else { 1 })
                .sum(),
        });
    }

    if let Some(opened) = front_matter {
        diagnostics.emit(
            Diagnostic::error("front matter is never closed")
                .with_code(ErrorCode::E106)
                .with_label(opened, "front matter opened here")
                .with_help("close the front matter with a line containing only `---`"),
        );
    }

    lines
}
