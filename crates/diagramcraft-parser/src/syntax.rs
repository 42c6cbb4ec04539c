//! Token-level parsers shared by the dialect checkers.
//!
//! Every checker runs these over one statement line at a time. Failures carry
//! a [`Expected`] context so they can be turned into a [`Diagnostic`] with a
//! stable code, a span and optional help text.

use winnow::{
    Parser,
    ascii::space0,
    combinator::{cut_err, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{take_till, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    lines::Line,
    span::Span,
};

pub(crate) type Input<'a> = LocatingSlice<&'a str>;
pub(crate) type IResult<O> = ModalResult<O, ContextError<Expected>>;

/// Diagnostic details attached to a winnow failure.
///
/// The error span covers from `start` to the position where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expected {
    pub code: ErrorCode,
    pub message: String,
    pub help: Option<&'static str>,
    pub start: usize,
}

impl Expected {
    pub fn new(code: ErrorCode, message: impl Into<String>, start: usize) -> Self {
        Self {
            code,
            message: message.into(),
            help: None,
            start,
        }
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// Commit to a failure at the current position.
pub(crate) fn fail<O>(input: &Input<'_>, expected: Expected) -> IResult<O> {
    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        expected,
    )))
}

pub(crate) fn backtrack<O>() -> IResult<O> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Run `parser` over a whole statement line.
///
/// Spans in the returned diagnostic are absolute source offsets.
pub(crate) fn parse_line<'a, O>(
    line: &Line<'a>,
    mut parser: impl Parser<Input<'a>, O, ErrMode<ContextError<Expected>>>,
) -> Result<O, Diagnostic> {
    let mut input = Input::new(line.text);
    parser.parse_next(&mut input).map_err(|err| {
        let error_pos = input.current_token_start();
        convert_err_mode(err, error_pos, line.text.len()).shifted(line.offset)
    })
}

fn convert_err_mode(
    err: ErrMode<ContextError<Expected>>,
    error_pos: usize,
    line_len: usize,
) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(Expected {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let end = if error_pos > *start {
            error_pos
        } else {
            line_len.max(*start)
        };
        let mut diagnostic = Diagnostic::error(message.clone())
            .with_code(*code)
            .with_label(Span::new(*start..end), code.description());
        if let Some(help) = help {
            diagnostic = diagnostic.with_help(*help);
        }
        return diagnostic;
    }

    Diagnostic::error("unrecognized statement")
        .with_code(ErrorCode::E105)
        .with_label(Span::new(0..line_len), ErrorCode::E105.description())
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A node or entity identifier.
///
/// Segments of identifier characters may be joined by single `-`, so
/// `api-gateway` is one identifier while `A-->B` stops after `A`.
pub(crate) fn identifier<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        take_while(1.., is_ident_char),
        repeat::<_, _, (), _, _>(0.., ('-', take_while(1.., is_ident_char))),
    )
        .take()
        .parse_next(input)
}

/// A double-quoted string; returns the text between the quotes.
pub(crate) fn quoted<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let start = input.current_token_start();
    preceded(
        '"',
        cut_err(terminated(take_till(0.., '"'), '"')).context(
            Expected::new(ErrorCode::E001, "unterminated string", start)
                .with_help("add the closing `\"`"),
        ),
    )
    .parse_next(input)
}

/// Optional spaces and tabs.
pub(crate) fn ws<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    space0.parse_next(input)
}

/// Closing delimiter for a label opener.
pub(crate) fn closer_for(open: char) -> Option<char> {
    match open {
        '[' => Some(']'),
        '(' => Some(')'),
        '{' => Some('}'),
        '>' => Some(']'),
        '|' => Some('|'),
        _ => None,
    }
}

/// Byte length of the delimited label at the start of `text`.
///
/// Nested openers of the same kind are balanced and quoted text is skipped,
/// so `[(Database)]` and `["a ] b"]` are each one label.
pub(crate) fn delimited_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, open) = chars.next()?;
    let close = closer_for(open)?;
    let nests = open != close && open != '>';
    let mut depth = 1usize;
    let mut in_quote = false;

    for (index, c) in chars {
        if c == '"' {
            in_quote = !in_quote;
        } else if in_quote {
            continue;
        } else if nests && c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(index + c.len_utf8());
            }
        }
    }
    None
}

/// A delimited label such as `[text]`, `((text))`, `{text}` or `|text|`.
///
/// Backtracks if the input does not start with one of `openers`; commits to
/// `E002` once an opener is seen but never closed.
pub(crate) fn delimited_label<'a>(
    openers: &'static [char],
) -> impl FnMut(&mut Input<'a>) -> IResult<&'a str> {
    move |input: &mut Input<'a>| {
        let rest = input.peek_finish();
        let Some(open) = rest.chars().next().filter(|c| openers.contains(c)) else {
            return backtrack();
        };
        let start = input.current_token_start();

        match delimited_len(rest) {
            Some(len) => Ok(input.next_slice(len)),
            None => {
                let close = closer_for(open).unwrap_or(open);
                input.finish();
                fail(
                    input,
                    Expected::new(
                        ErrorCode::E002,
                        format!("`{open}` is never closed, expected `{close}`"),
                        start,
                    )
                    .with_help("close the label on the same line"),
                )
            }
        }
    }
}

/// Accept optional whitespace and a `;`, then require the end of the line.
pub(crate) fn end_of_statement(input: &mut Input<'_>) -> IResult<()> {
    ws(input)?;
    if input.peek_finish().starts_with(';') {
        input.next_token();
        ws(input)?;
    }
    if input.eof_offset() == 0 {
        return Ok(());
    }

    let start = input.current_token_start();
    let rest = input.finish();
    fail(
        input,
        Expected::new(
            ErrorCode::E003,
            format!("unexpected `{}`", rest.trim_end()),
            start,
        ),
    )
}

/// Split `key` off the front of `line` if it is followed by whitespace or ends the line.
///
/// Returns the remainder with leading whitespace removed.
pub(crate) fn keyword<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        Some(';') => Some(rest[1..].trim_start()),
        _ => None,
    }
}

/// Split a line on `;` separators outside quotes and labels.
pub(crate) fn split_statements<'a>(line: &Line<'a>) -> Vec<Line<'a>> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut in_pipe = false;

    for (index, c) in line.text.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            _ if in_quote => {}
            '|' => in_pipe = !in_pipe,
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 && !in_pipe => {
                push_part(line, start, index, &mut parts);
                start = index + 1;
            }
            _ => {}
        }
    }
    push_part(line, start, line.text.len(), &mut parts);
    parts
}

fn push_part<'a>(line: &Line<'a>, start: usize, end: usize, parts: &mut Vec<Line<'a>>) {
    let raw = &line.text[start..end];
    let text = raw.trim();
    if !text.is_empty() {
        let lead = raw.len() - raw.trim_start().len();
        parts.push(Line {
            offset: line.offset + start + lead,
            text,
            ..*line
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line<'_> {
        Line {
            number: 1,
            offset: 0,
            text,
            indent: 0,
        }
    }

    #[test]
    fn test_identifier_stops_at_arrow() {
        let mut input = Input::new("A-->B");
        assert_eq!(identifier(&mut input).unwrap(), "A");

        let mut input = Input::new("api-gateway --> db");
        assert_eq!(identifier(&mut input).unwrap(), "api-gateway");
    }

    #[test]
    fn test_quoted_unterminated() {
        let err = parse_line(&line("\"open"), quoted).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E001));
        assert_eq!(err.primary_span(), Some(Span::new(0..5)));
    }

    #[test]
    fn test_delimited_len() {
        assert_eq!(delimited_len("[(Database)] rest"), Some(12));
        assert_eq!(delimited_len("[\"a ] b\"]"), Some(9));
        assert_eq!(delimited_len("((circle))"), Some(10));
        assert_eq!(delimited_len(">flag]"), Some(6));
        assert_eq!(delimited_len("|yes|B"), Some(5));
        assert_eq!(delimited_len("[open"), None);
        assert_eq!(delimited_len("plain"), None);
    }

    #[test]
    fn test_unclosed_label() {
        let err = parse_line(&line("[Start"), delimited_label(&['['])).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_end_of_statement_rejects_residue() {
        let err = parse_line(&line("  stray"), end_of_statement).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E003));
        assert_eq!(err.message(), "unexpected `stray`");
        assert!(parse_line(&line(" ; "), end_of_statement).is_ok());
    }

    #[test]
    fn test_keyword() {
        assert_eq!(keyword("subgraph One", "subgraph"), Some("One"));
        assert_eq!(keyword("end", "end"), Some(""));
        assert_eq!(keyword("endpoint", "end"), None);
    }

    #[test]
    fn test_split_statements() {
        let source = "A-->B; B-->C[\"x;y\"];";
        let parts = split_statements(&line(source));
        let texts: Vec<_> = parts.iter().map(|part| part.text).collect();

        assert_eq!(texts, vec!["A-->B", "B-->C[\"x;y\"]"]);
        assert_eq!(parts[1].offset, 7);
    }
}
