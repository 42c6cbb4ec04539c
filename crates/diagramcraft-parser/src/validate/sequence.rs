//! Sequence diagram statements.

use winnow::{
    Parser as _,
    combinator::{alt, opt},
    stream::{Location, Stream},
    token::{one_of, take_till},
};

use super::{Blocks, missing_text, unrecognized};
use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{Expected, IResult, Input, fail, keyword, parse_line},
};

const MESSAGE_HELP: &str = "expected a message such as `Alice->>Bob: Hello`";

const BLOCKS: &[&str] = &["loop", "alt", "opt", "par", "par_over", "critical", "break", "rect", "box"];

/// Clauses that split a block, with the blocks they may appear in.
const CLAUSES: &[(&str, &[&str])] = &[
    ("else", &["alt"]),
    ("and", &["par", "par_over"]),
    ("option", &["critical"]),
];

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut blocks = Blocks::new("end");
    for line in lines {
        if let Err(diagnostic) = statement(line, &mut blocks, diagnostics) {
            diagnostics.emit(diagnostic);
        }
    }
    blocks.finish(diagnostics);
    lines.len()
}

fn statement(
    line: &Line<'_>,
    blocks: &mut Blocks,
    diagnostics: &mut DiagnosticCollector,
) -> Result<(), Diagnostic> {
    let text = line.text;
    let word = text.split_whitespace().next().unwrap_or_default();

    if keyword(text, "end").is_some() {
        blocks.close(line, diagnostics);
        return Ok(());
    }
    if BLOCKS.contains(&word) {
        blocks.open(word, line);
        return Ok(());
    }
    if let Some((clause, allowed)) = CLAUSES.iter().find(|(clause, _)| *clause == word) {
        return match blocks.innermost() {
            Some(open) if allowed.contains(&open) => Ok(()),
            _ => Err(Diagnostic::error(format!(
                "`{clause}` outside of an `{}` block",
                allowed[0]
            ))
            .with_code(ErrorCode::E204)
            .with_label(line.span(), ErrorCode::E204.description())
            .with_help("move the clause inside the block it belongs to")),
        };
    }

    match word {
        "participant" | "actor" | "destroy" | "activate" | "deactivate" => {
            let rest = keyword(text, word).unwrap_or_default();
            if rest.is_empty() {
                return Err(missing_text(
                    line,
                    &format!("`{word}`"),
                    "name the participant, e.g. `participant Alice`",
                ));
            }
            Ok(())
        }
        "create" => {
            let rest = keyword(text, word).unwrap_or_default();
            if keyword(rest, "participant").is_some() || keyword(rest, "actor").is_some() {
                Ok(())
            } else {
                Err(unrecognized(line, "use `create participant Name` or `create actor Name`"))
            }
        }
        "autonumber" => Ok(()),
        _ if text.starts_with("title") || text.starts_with("accTitle") || text.starts_with("accDescr") => {
            Ok(())
        }
        "link" | "links" => {
            if text.contains(':') {
                Ok(())
            } else {
                Err(missing_text(line, &format!("`{word}`"), "add `: label @ url` after the participant"))
            }
        }
        _ if word.eq_ignore_ascii_case("note") => note(line, &text[word.len()..]),
        _ => parse_line(line, message),
    }
}

fn note(line: &Line<'_>, rest: &str) -> Result<(), Diagnostic> {
    let rest = rest.trim_start();
    let placed = ["left of", "right of", "over"]
        .iter()
        .any(|position| rest.starts_with(position));
    if !placed {
        return Err(unrecognized(
            line,
            "place the note with `left of`, `right of` or `over`",
        ));
    }
    match rest.split_once(':') {
        Some((target, _)) if !target.trim().is_empty() => Ok(()),
        _ => Err(missing_text(
            line,
            "note",
            "add text after a colon, e.g. `Note over Alice: thinking`",
        )),
    }
}

fn participant<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_till(0.., ['-', '<', ':']).parse_next(input)
}

fn activation(input: &mut Input<'_>) -> IResult<char> {
    one_of(['+', '-']).parse_next(input)
}

fn arrow<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    alt((
        "<<-->>", "<<->>", "-->>", "->>", "-->", "->", "--x", "-x", "--)", "-)",
    ))
    .parse_next(input)
}

/// `Sender ARROW [+|-]Receiver: text`
fn message<'a>(input: &mut Input<'a>) -> IResult<()> {
    let start = input.current_token_start();
    let sender = participant(input)?;

    let arrow_start = input.current_token_start();
    let Some(op) = opt(arrow).parse_next(input)? else {
        let line = input.peek_finish();
        input.finish();
        return fail(
            input,
            Expected::new(
                ErrorCode::E105,
                format!("unrecognized statement `{sender}{line}`"),
                start,
            )
            .with_help(MESSAGE_HELP),
        );
    };

    if sender.trim().is_empty() {
        return fail(
            input,
            Expected::new(
                ErrorCode::E104,
                format!("message `{op}` has no sender"),
                arrow_start,
            )
            .with_help(MESSAGE_HELP),
        );
    }

    opt(activation).parse_next(input)?;
    let receiver = participant(input)?;
    if receiver.trim().is_empty() {
        return fail(
            input,
            Expected::new(
                ErrorCode::E103,
                format!("message `{op}` has no receiver"),
                arrow_start,
            )
            .with_help(MESSAGE_HELP),
        );
    }

    if input.eof_offset() == 0 {
        return fail(
            input,
            Expected::new(ErrorCode::E109, "message is missing its text", start)
                .with_help("add text after a colon, e.g. `Alice->>Bob: Hello`"),
        );
    }
    input.finish();
    Ok(())
}
