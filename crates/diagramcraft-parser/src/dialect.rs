//! Diagram dialects and header parsing.

use std::{fmt, str::FromStr};

use crate::{
    error::{Diagnostic, ErrorCode},
    lines::Line,
    span::Span,
};

/// Flow direction of a flowchart or a `direction` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" | "TD" => Ok(Direction::TopToBottom),
            "BT" => Ok(Direction::BottomToTop),
            "LR" => Ok(Direction::LeftToRight),
            "RL" => Ok(Direction::RightToLeft),
            _ => Err(()),
        }
    }
}

pub(crate) const DIRECTION_HELP: &str = "use one of `TB`, `TD`, `BT`, `LR` or `RL`";

/// Build the `E102` diagnostic for an invalid direction token.
pub(crate) fn invalid_direction(token: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("invalid direction `{token}`"))
        .with_code(ErrorCode::E102)
        .with_label(span, ErrorCode::E102.description())
        .with_help(DIRECTION_HELP)
}

/// The Mermaid diagram families the validator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Flowchart { direction: Option<Direction> },
    Sequence,
    Class,
    State,
    EntityRelationship,
    Gantt,
    Pie,
    Journey,
    Mindmap,
    GitGraph,
}

impl Dialect {
    /// Header keyword that starts this dialect.
    pub fn keyword(&self) -> &'static str {
        match self {
            Dialect::Flowchart { .. } => "flowchart",
            Dialect::Sequence => "sequenceDiagram",
            Dialect::Class => "classDiagram",
            Dialect::State => "stateDiagram-v2",
            Dialect::EntityRelationship => "erDiagram",
            Dialect::Gantt => "gantt",
            Dialect::Pie => "pie",
            Dialect::Journey => "journey",
            Dialect::Mindmap => "mindmap",
            Dialect::GitGraph => "gitGraph",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

const SUPPORTED_HELP: &str = "supported headers: `graph`/`flowchart`, `sequenceDiagram`, \
    `classDiagram`, `stateDiagram-v2`, `erDiagram`, `gantt`, `pie`, `journey`, `mindmap`, `gitGraph`";

/// A parsed header line.
#[derive(Debug)]
pub(crate) struct Header<'a> {
    pub dialect: Dialect,
    /// Statements written on the header line after a `;`.
    pub rest: Option<Line<'a>>,
}

/// Parse the first statement line as a diagram header.
pub(crate) fn parse_header<'a>(line: &Line<'a>) -> Result<Header<'a>, Diagnostic> {
    let text = line.text;
    let word_len = text
        .find(|c: char| !(c.is_alphanumeric() || c == '-'))
        .unwrap_or(text.len());
    let word = &text[..word_len];
    let after = &text[word_len..];

    let simple = |dialect: Dialect| -> Result<Header<'a>, Diagnostic> {
        trailing(line, word_len, dialect, |_| false)
    };

    match word {
        "graph" | "flowchart" => flowchart_header(line, word_len),
        "sequenceDiagram" => simple(Dialect::Sequence),
        "classDiagram" | "classDiagram-v2" => simple(Dialect::Class),
        "stateDiagram" | "stateDiagram-v2" => simple(Dialect::State),
        "erDiagram" => simple(Dialect::EntityRelationship),
        "gantt" => simple(Dialect::Gantt),
        "journey" => simple(Dialect::Journey),
        "mindmap" => simple(Dialect::Mindmap),
        "pie" => trailing(line, word_len, Dialect::Pie, |rest| {
            rest.starts_with("showData") || rest.starts_with("title")
        }),
        "gitGraph" => trailing(line, word_len, Dialect::GitGraph, |rest| {
            matches!(rest, ":" | "LR:" | "TB:" | "BT:" | "LR" | "TB" | "BT")
        }),
        "" => Err(missing_header(line)),
        _ if after.is_empty() || after.starts_with(char::is_whitespace) => {
            let span = line.span_of(word);
            Err(Diagnostic::error(format!("unknown diagram type `{word}`"))
                .with_code(ErrorCode::E101)
                .with_label(span, ErrorCode::E101.description())
                .with_help(SUPPORTED_HELP))
        }
        _ => Err(missing_header(line)),
    }
}

fn missing_header(line: &Line<'_>) -> Diagnostic {
    Diagnostic::error("description does not start with a diagram header")
        .with_code(ErrorCode::E100)
        .with_label(line.span(), "expected a header here")
        .with_help("start the description with a header such as `graph TD`")
}

fn flowchart_header<'a>(line: &Line<'a>, word_len: usize) -> Result<Header<'a>, Diagnostic> {
    let after = &line.text[word_len..];
    let stripped = after.trim_start();
    let token_len = stripped
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(stripped.len());
    let token = &stripped[..token_len];

    let direction = if token.is_empty() {
        None
    } else {
        let direction = token
            .parse::<Direction>()
            .map_err(|()| invalid_direction(token, line.span_of(token)))?;
        Some(direction)
    };

    let consumed = line.text.len() - stripped.len() + token_len;
    trailing(
        line,
        consumed,
        Dialect::Flowchart { direction },
        |_| false,
    )
}

/// Finish a header whose keyword part spans `text[..consumed]`.
///
/// A `;` hands the rest of the line to the body. Any other trailing text must
/// satisfy `allowed`.
fn trailing<'a>(
    line: &Line<'a>,
    consumed: usize,
    dialect: Dialect,
    allowed: impl Fn(&str) -> bool,
) -> Result<Header<'a>, Diagnostic> {
    let rest = line.text[consumed..].trim();
    if rest.is_empty() || allowed(rest) {
        return Ok(Header {
            dialect,
            rest: None,
        });
    }
    if let Some(tail) = rest.strip_prefix(';') {
        let start = line.text.len() - tail.len();
        let rest_line = line.tail(start);
        return Ok(Header {
            dialect,
            rest: (!rest_line.text.is_empty()).then_some(rest_line),
        });
    }

    Err(Diagnostic::error(format!("unexpected `{rest}` after the header"))
        .with_code(ErrorCode::E105)
        .with_label(line.span_of(rest), ErrorCode::E105.description())
        .with_help("put statements on the lines below the header"))
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
    fn test_flowchart_headers() {
        let header = parse_header(&line("graph TD")).unwrap();
        assert_eq!(
            header.dialect,
            Dialect::Flowchart {
                direction: Some(Direction::TopToBottom)
            }
        );
        assert!(header.rest.is_none());

        let header = parse_header(&line("flowchart")).unwrap();
        assert_eq!(header.dialect, Dialect::Flowchart { direction: None });
    }

    #[test]
    fn test_statements_after_semicolon() {
        let header = parse_header(&line("graph LR; A-->B")).unwrap();
        let rest = header.rest.unwrap();
        assert_eq!(rest.text, "A-->B");
        assert_eq!(rest.offset, 10);
    }

    #[test]
    fn test_invalid_direction() {
        let err = parse_header(&line("graph XY")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E102));
        assert_eq!(err.primary_span(), Some(Span::new(6..8)));
    }

    #[test]
    fn test_other_headers() {
        assert_eq!(
            parse_header(&line("sequenceDiagram")).unwrap().dialect,
            Dialect::Sequence
        );
        assert_eq!(
            parse_header(&line("pie showData title Pets")).unwrap().dialect,
            Dialect::Pie
        );
        assert_eq!(
            parse_header(&line("gitGraph LR:")).unwrap().dialect,
            Dialect::GitGraph
        );
        assert_eq!(
            parse_header(&line("stateDiagram")).unwrap().dialect,
            Dialect::State
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = parse_header(&line("timeline")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert!(err.help().unwrap().contains("sequenceDiagram"));
    }

    #[test]
    fn test_statement_instead_of_header() {
        let err = parse_header(&line("A-->B")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse_header(&line("sequenceDiagram Alice")).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E105));
    }
}
