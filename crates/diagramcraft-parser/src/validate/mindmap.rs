//! Mindmap statements.
//!
//! Nesting is expressed by indentation, so the first node is the root and
//! every later node must be indented deeper than it.

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
};

const PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut root: Option<&Line<'_>> = None;

    for line in lines {
        // `::icon(..)` and `:::class` decorate the node above them.
        if line.text.starts_with("::") {
            continue;
        }
        if let Err(diagnostic) = balanced(line) {
            diagnostics.emit(diagnostic);
        }

        match root {
            None => root = Some(line),
            Some(first) if line.indent <= first.indent => {
                diagnostics.emit(
                    Diagnostic::error("mindmap has more than one root")
                        .with_code(ErrorCode::E203)
                        .with_label(line.span(), ErrorCode::E203.description())
                        .with_secondary_label(first.span(), "first root")
                        .with_help("indent the node below the root"),
                );
            }
            Some(_) => {}
        }
    }
    lines.len()
}

/// Shape delimiters in a node must pair up, e.g. `id((circle))` or `)cloud(`.
fn balanced(line: &Line<'_>) -> Result<(), Diagnostic> {
    let mut in_quote = false;
    let mut counts = [(0usize, 0usize); PAIRS.len()];

    for c in line.text.chars() {
        if c == '"' {
            in_quote = !in_quote;
            continue;
        }
        if in_quote {
            continue;
        }
        for (index, (open, close)) in PAIRS.iter().enumerate() {
            if c == *open {
                counts[index].0 += 1;
            } else if c == *close {
                counts[index].1 += 1;
            }
        }
    }

    match PAIRS
        .iter()
        .zip(counts)
        .find(|(_, (opened, closed))| opened != closed)
    {
        Some(((open, close), _)) => Err(Diagnostic::error(format!(
            "unbalanced `{open}` and `{close}` in node"
        ))
        .with_code(ErrorCode::E002)
        .with_label(line.span(), ErrorCode::E002.description())
        .with_help("close the node shape on the same line")),
        None => Ok(()),
    }
}
