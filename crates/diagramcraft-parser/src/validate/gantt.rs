//! Gantt chart statements.

use super::{missing_text, unrecognized};
use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::keyword,
};

/// Settings that must be followed by a value.
const SETTINGS: &[&str] = &[
    "dateFormat",
    "axisFormat",
    "tickInterval",
    "excludes",
    "includes",
    "todayMarker",
    "weekday",
    "displayMode",
];

/// Statements accepted as written.
const FLAGS: &[&str] = &[
    "title",
    "inclusiveEndDates",
    "topAxis",
    "click",
    "accTitle",
    "accDescr",
];

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
            return Err(missing_text(line, "`section`", "name the section, e.g. `section Design`"));
        }
        return Ok(());
    }
    for setting in SETTINGS {
        if let Some(rest) = keyword(text, setting) {
            if rest.is_empty() {
                return Err(missing_text(
                    line,
                    &format!("`{setting}`"),
                    "give the setting a value, e.g. `dateFormat YYYY-MM-DD`",
                ));
            }
            return Ok(());
        }
    }
    let word = text.split_whitespace().next().unwrap_or_default();
    if FLAGS.iter().any(|flag| word.starts_with(flag)) {
        return Ok(());
    }

    task(line)
}

/// `Name : [tags,] [id,] start, end-or-duration`
fn task(line: &Line<'_>) -> Result<(), Diagnostic> {
    let Some((name, timing)) = line.text.split_once(':') else {
        return Err(unrecognized(
            line,
            "expected a task such as `Design : des1, 2024-01-06, 3d`",
        ));
    };
    if name.trim().is_empty() {
        return Err(missing_text(line, "task", "name the task before the colon"));
    }
    if timing.trim().is_empty() {
        return Err(missing_text(
            line,
            "task timing",
            "add a start and a duration after the colon, e.g. `: 2024-01-06, 3d`",
        ));
    }
    if timing.split(',').any(|field| field.trim().is_empty()) {
        return Err(Diagnostic::error("task has an empty field")
            .with_code(ErrorCode::E105)
            .with_label(line.span_of(timing), ErrorCode::E105.description())
            .with_help("remove the extra `,`"));
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
    fn test_valid_gantt() {
        let source = "gantt
    title Release plan
    dateFormat YYYY-MM-DD
    excludes weekends
    section Design
    Wireframes :done, des1, 2024-01-06, 3d
    Review     :active, after des1, 2d
    section Build
    Backend    :crit, 5d";

        assert_eq!(validate(source).unwrap().statement_count(), 8);
    }

    #[test]
    fn test_task_errors() {
        assert_eq!(codes("gantt\nWireframes"), vec![ErrorCode::E105]);
        assert_eq!(codes("gantt\nWireframes :"), vec![ErrorCode::E109]);
        assert_eq!(codes("gantt\n: 3d"), vec![ErrorCode::E109]);
        assert_eq!(codes("gantt\nWireframes : des1,, 3d"), vec![ErrorCode::E105]);
    }

    #[test]
    fn test_settings_need_values() {
        assert_eq!(codes("gantt\ndateFormat"), vec![ErrorCode::E109]);
        assert_eq!(codes("gantt\nsection"), vec![ErrorCode::E109]);
    }
}
