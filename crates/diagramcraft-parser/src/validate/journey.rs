//! User journey statements.

use super::{missing_text, unrecognized};
use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::keyword,
};

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    for line in lines {
        if let Err(diagnostic) = statement(line) {
            diagnostics.emit(diagnostic);
        }
    }
    lines.len()
}

fn statement(line: &Line<'_>) -> Result<(), Diagnostic> {
    let text = line.text;
    if let Some(rest) = keyword(text, "section") {
        if rest.is_empty() {
            return Err(missing_text(line, "`section`", "name the section, e.g. `section Go to work`"));
        }
        return Ok(());
    }
    if ["title", "accTitle", "accDescr"]
        .iter()
        .any(|kw| text.starts_with(kw))
    {
        return Ok(());
    }

    let mut parts = text.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    let Some(score) = parts.next() else {
        return Err(unrecognized(
            line,
            "expected a task such as `Make tea: 5: Me`",
        ));
    };
    if name.trim().is_empty() {
        return Err(missing_text(line, "task", "name the task before the first colon"));
    }

    let score = score.trim();
    if score.is_empty() {
        return Err(missing_text(line, "task score", "add a score after the task name, e.g. `: 5`"));
    }
    if score.parse::<u8>().is_err() {
        return Err(Diagnostic::error(format!("`{score}` is not a valid score"))
            .with_code(ErrorCode::E108)
            .with_label(line.span_of(score), ErrorCode::E108.description())
            .with_help("scores are whole numbers, usually from 1 to 5"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    fn codes(source: &str) -> Vec<ErrorCode> {
        validate(source)
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_valid_journey() {
        let source = "journey
    title My working day
    section Go to work
      Make tea: 5: Me
      Go upstairs: 3: Me, Cat
    section Go home
      Sit down: 5";

        assert_eq!(validate(source).unwrap().statement_count(), 6);
    }

    #[test]
    fn test_task_errors() {
        assert_eq!(codes("journey\nMake tea"), vec![ErrorCode::E105]);
        assert_eq!(codes("journey\nMake tea: high: Me"), vec![ErrorCode::E108]);
        assert_eq!(codes("journey\nMake tea: : Me"), vec![ErrorCode::E109]);
        assert_eq!(codes("journey\nsection"), vec![ErrorCode::E109]);
    }
}
