//! State diagram statements.

use winnow::{
    Parser as _,
    combinator::alt,
    stream::{Location, Stream},
};

use super::{Blocks, missing_text, unrecognized};
use crate::{
    dialect::{Direction, invalid_direction},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{
        Expected, IResult, Input, end_of_statement, fail, identifier, keyword, parse_line, quoted,
        ws,
    },
};

const TRANSITION_HELP: &str = "expected a transition such as `Idle --> Running`";

const PASSTHROUGH: &[&str] = &["classDef", "class", "style", "hide", "accTitle", "accDescr"];

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut blocks = Blocks::new("}");
    let mut note: Option<Line<'_>> = None;

    for line in lines {
        if note.is_some() {
            if line.text == "end note" {
                note = None;
            }
            continue;
        }
        if let Err(diagnostic) = statement(line, &mut blocks, &mut note, diagnostics) {
            diagnostics.emit(diagnostic);
        }
    }

    if let Some(opened) = note {
        diagnostics.emit(
            Diagnostic::error("note is never closed")
                .with_code(ErrorCode::E106)
                .with_label(opened.span(), "note opened here")
                .with_help("close the note with `end note`"),
        );
    }
    blocks.finish(diagnostics);
    lines.len()
}

fn statement<'a>(
    line: &Line<'a>,
    blocks: &mut Blocks,
    note: &mut Option<Line<'a>>,
    diagnostics: &mut DiagnosticCollector,
) -> Result<(), Diagnostic> {
    let text = line.text;

    if text == "}" {
        blocks.close(line, diagnostics);
        return Ok(());
    }
    if text == "--" {
        return match blocks.innermost() {
            Some(_) => Ok(()),
            None => Err(Diagnostic::error("`--` outside of a composite state")
                .with_code(ErrorCode::E204)
                .with_label(line.span(), ErrorCode::E204.description())
                .with_help("concurrent regions are separated inside `state Name { .. }`")),
        };
    }
    if let Some(rest) = keyword(text, "state") {
        return state_declaration(line, rest, blocks);
    }
    if let Some(rest) = keyword(text, "note") {
        return note_statement(line, rest, note);
    }
    if let Some(rest) = keyword(text, "direction") {
        return rest
            .parse::<Direction>()
            .map(|_| ())
            .map_err(|()| invalid_direction(rest, line.span_of(rest)));
    }
    let word = text.split_whitespace().next().unwrap_or_default();
    if PASSTHROUGH.iter().any(|kw| word.starts_with(kw)) {
        return Ok(());
    }

    parse_line(line, transition)
}

/// `state "Description" as Id`, `state Id {`, `state Id <<fork>>`.
fn state_declaration(line: &Line<'_>, rest: &str, blocks: &mut Blocks) -> Result<(), Diagnostic> {
    if rest.is_empty() {
        return Err(missing_text(line, "`state`", "name the state, e.g. `state Busy`"));
    }
    if rest.starts_with('"') {
        let tail = line.tail(line.text.len() - rest.len());
        return parse_line(&tail, |input: &mut Input<'_>| -> IResult<()> {
            quoted(input)?;
            ws(input)?;
            let start = input.current_token_start();
            let alias = input.peek_finish();
            if keyword(alias, "as").is_none_or(str::is_empty) {
                input.finish();
                return fail(
                    input,
                    Expected::new(ErrorCode::E105, "expected `as Id` after the description", start)
                        .with_help("write `state \"Description\" as Id`"),
                );
            }
            input.finish();
            Ok(())
        });
    }
    if rest.ends_with('{') {
        blocks.open("state", line);
    }
    Ok(())
}

/// `note left of Id : text` or a multi-line note ending in `end note`.
fn note_statement<'a>(
    line: &Line<'a>,
    rest: &str,
    note: &mut Option<Line<'a>>,
) -> Result<(), Diagnostic> {
    let placed = ["left of", "right of"]
        .iter()
        .any(|position| rest.starts_with(position));
    if !placed {
        return Err(unrecognized(line, "place the note with `left of` or `right of`"));
    }
    match rest.split_once(':') {
        Some((_, body)) if body.trim().is_empty() => Err(missing_text(
            line,
            "note",
            "add text after the colon or end the note with `end note`",
        )),
        Some(_) => Ok(()),
        None => {
            *note = Some(*line);
            Ok(())
        }
    }
}

fn state_ref<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let name = alt(("[*]", identifier)).parse_next(input)?;
    if input.peek_finish().starts_with(":::") {
        input.next_slice(3);
        identifier(input)?;
    }
    Ok(name)
}

/// `A --> B [: label]`, `A : description` or a bare `A`.
fn transition(input: &mut Input<'_>) -> IResult<()> {
    let start = input.current_token_start();
    if input.peek_finish().starts_with("-->") {
        input.next_slice(3);
        return fail(
            input,
            Expected::new(ErrorCode::E104, "transition `-->` has no source state", start)
                .with_help(TRANSITION_HELP),
        );
    }
    if state_ref(input).is_err() {
        input.finish();
        return fail(
            input,
            Expected::new(ErrorCode::E105, "unrecognized statement", start)
                .with_help(TRANSITION_HELP),
        );
    }
    ws(input)?;

    let op_start = input.current_token_start();
    if input.peek_finish().starts_with("-->") {
        input.next_slice(3);
        ws(input)?;
        let rest = input.peek_finish();
        if rest.is_empty() || rest.starts_with(':') {
            return fail(
                input,
                Expected::new(
                    ErrorCode::E103,
                    "transition `-->` has no target state",
                    op_start,
                )
                .with_help(TRANSITION_HELP),
            );
        }
        state_ref(input)?;
        ws(input)?;
        if input.peek_finish().starts_with(':') {
            input.finish();
            return Ok(());
        }
        return end_of_statement(input);
    }

    if input.peek_finish().starts_with(':') {
        input.next_token();
        if input.peek_finish().trim().is_empty() {
            return fail(
                input,
                Expected::new(ErrorCode::E109, "state description is missing its text", start)
                    .with_help("add text after the colon, e.g. `Idle : waiting for input`"),
            );
        }
        input.finish();
        return Ok(());
    }
    end_of_statement(input)
}
