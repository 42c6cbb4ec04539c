use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    span::Span,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenBlock {
    keyword: String,
    span: Span,
}

/// Stack of open blocks (`subgraph`, `loop`, `state X {`, ...).
#[derive(Debug)]
pub(crate) struct Blocks {
    closer: &'static str,
    stack: Vec<OpenBlock>,
}

impl Blocks {
    /// Blocks that are closed by `closer`, e.g. `end` or `}`.
    pub fn new(closer: &'static str) -> Self {
        Self {
            closer,
            stack: Vec::new(),
        }
    }

    pub fn open(&mut self, keyword: &str, line: &Line<'_>) {
        self.stack.push(OpenBlock {
            keyword: keyword.to_string(),
            span: line.span(),
        });
    }

    /// Keyword of the innermost open block.
    pub fn innermost(&self) -> Option<&str> {
        self.stack.last().map(|block| block.keyword.as_str())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close the innermost block, reporting `E107` when none is open.
    pub fn close(&mut self, line: &Line<'_>, diagnostics: &mut DiagnosticCollector) {
        if self.stack.pop().is_none() {
            diagnostics.emit(
                Diagnostic::error(format!("`{}` without an open block", self.closer))
                    .with_code(ErrorCode::E107)
                    .with_label(line.span(), ErrorCode::E107.description())
                    .with_help("remove it or open a block before it"),
            );
        }
    }

    /// Report every block still open at the end of the description.
    pub fn finish(self, diagnostics: &mut DiagnosticCollector) {
        for block in self.stack.into_iter().rev() {
            diagnostics.emit(
                Diagnostic::error(format!("`{}` block is never closed", block.keyword))
                    .with_code(ErrorCode::E106)
                    .with_label(block.span, "block opened here")
                    .with_help(match self.closer {
                        "}" => "close the block with `}`",
                        _ => "close the block with `end`",
                    }),
            );
        }
    }
}
