//! Class diagram statements.

use winnow::{
    Parser as _,
    combinator::opt,
    stream::{Location, Stream},
    token::take_till,
};

use super::{Blocks, missing_text, unrecognized};
use crate::{
    dialect::{Direction, invalid_direction},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{
        Expected, IResult, Input, backtrack, delimited_label, end_of_statement, fail, identifier,
        keyword, parse_line, quoted, ws,
    },
};

const RELATION_HELP: &str = "expected a relationship such as `Animal <|-- Duck`";

const PASSTHROUGH: &[&str] = &[
    "classDef", "cssClass", "style", "click", "link", "callback", "accTitle", "accDescr", "note",
];

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut blocks = Blocks::new("}");
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

    if text == "}" {
        blocks.close(line, diagnostics);
        return Ok(());
    }
    // Member lines inside `class Name { .. }` are free-form.
    if blocks.innermost() == Some("class") {
        return Ok(());
    }
    if let Some(rest) = keyword(text, "class") {
        if parse_line(&line.tail(text.len() - rest.len()), class_declaration)? {
            blocks.open("class", line);
        }
        return Ok(());
    }
    if let Some(rest) = keyword(text, "namespace") {
        if rest.trim_end_matches('{').trim().is_empty() {
            return Err(missing_text(line, "`namespace`", "name the namespace, e.g. `namespace Shapes {`"));
        }
        if rest.ends_with('{') {
            blocks.open("namespace", line);
        }
        return Ok(());
    }
    if let Some(rest) = keyword(text, "direction") {
        return rest
            .parse::<Direction>()
            .map(|_| ())
            .map_err(|()| invalid_direction(rest, line.span_of(rest)));
    }
    if text.starts_with("<<") {
        return match text.find(">>") {
            Some(end) if !text[end + 2..].trim().is_empty() => Ok(()),
            _ => Err(unrecognized(line, "annotate a class with `<<interface>> Name`")),
        };
    }
    let word = text.split_whitespace().next().unwrap_or_default();
    if PASSTHROUGH.iter().any(|kw| word.starts_with(kw)) {
        return Ok(());
    }

    parse_line(line, relation)
}

/// `Name[~T~]["Label"][:::style] [{]`; returns whether a body block opens.
fn class_declaration(input: &mut Input<'_>) -> IResult<bool> {
    let start = input.current_token_start();
    if class_name(input).is_err() {
        input.finish();
        return fail(
            input,
            Expected::new(ErrorCode::E109, "`class` is missing its name", start)
                .with_help("name the class, e.g. `class Animal`"),
        );
    }
    opt(delimited_label(&['['])).parse_next(input)?;
    if input.peek_finish().starts_with(":::") {
        input.next_slice(3);
        identifier(input)?;
    }
    ws(input)?;
    let opens = input.peek_finish().starts_with('{');
    if opens {
        input.next_token();
    }
    end_of_statement(input)?;
    Ok(opens)
}

fn class_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let name = identifier(input)?;
    if input.peek_finish().starts_with('~') {
        input.next_token();
        generic_parameters(input)?;
        if input.next_token() != Some('~') {
            return backtrack();
        }
    }
    Ok(name)
}

fn generic_parameters<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_till(0.., '~').parse_next(input)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Byte length of the relationship operator at the start of `text`.
fn relation_len(text: &str) -> Option<usize> {
    const LEFT: &[&str] = &["<|", "()", "*", "o", "<", ""];
    const BODY: &[&str] = &["--", ".."];
    const RIGHT: &[&str] = &["|>", "()", "*", "o", ">"];

    let (left, rest) = LEFT.iter().find_map(|left| {
        let rest = text.strip_prefix(*left)?;
        BODY.iter().any(|body| rest.starts_with(body)).then_some((left, rest))
    })?;

    let after_body = &rest[2..];
    let right = RIGHT
        .iter()
        .find(|right| {
            after_body.starts_with(**right)
                && (**right != "o"
                    || !after_body
                        .as_bytes()
                        .get(1)
                        .is_some_and(|b| is_ident_byte(*b)))
        })
        .map_or(0, |right| right.len());

    Some(left.len() + 2 + right)
}

/// `["card"] A ["card"] OP ["card"] B [: label]` or a member line `A : member`.
fn relation(input: &mut Input<'_>) -> IResult<()> {
    let start = input.current_token_start();
    opt(quoted).parse_next(input)?;
    ws(input)?;

    if let Some(len) = relation_len(input.peek_finish()) {
        let op = input.next_slice(len);
        return fail(
            input,
            Expected::new(
                ErrorCode::E104,
                format!("relationship `{op}` has no source class"),
                start,
            )
            .with_help(RELATION_HELP),
        );
    }

    if class_name(input).is_err() {
        input.finish();
        return fail(
            input,
            Expected::new(ErrorCode::E105, "unrecognized statement", start)
                .with_help(RELATION_HELP),
        );
    }
    ws(input)?;

    if input.peek_finish().starts_with(':') {
        input.next_token();
        if input.peek_finish().trim().is_empty() {
            return fail(
                input,
                Expected::new(ErrorCode::E109, "member line is missing its text", start)
                    .with_help("add the member after the colon, e.g. `Animal : +int age`"),
            );
        }
        input.finish();
        return Ok(());
    }

    opt(quoted).parse_next(input)?;
    ws(input)?;
    let op_start = input.current_token_start();
    let Some(len) = relation_len(input.peek_finish()) else {
        if input.eof_offset() == 0 {
            return fail(
                input,
                Expected::new(ErrorCode::E105, "declare classes with `class Name`", start)
                    .with_help(RELATION_HELP),
            );
        }
        return end_of_statement(input);
    };
    let op = input.next_slice(len);
    ws(input)?;
    opt(quoted).parse_next(input)?;
    ws(input)?;

    let rest = input.peek_finish();
    if rest.is_empty() || rest.starts_with(':') {
        return fail(
            input,
            Expected::new(
                ErrorCode::E103,
                format!("relationship `{op}` has no target class"),
                op_start,
            )
            .with_help(RELATION_HELP),
        );
    }
    class_name(input)?;
    ws(input)?;
    if input.peek_finish().starts_with(':') {
        input.finish();
        return Ok(());
    }
    end_of_statement(input)
}
