//! Flowchart (`graph` / `flowchart`) statements.
//!
//! ```text
//! A[Start] --> B{Choice}
//! B -->|yes| C & D
//! A -- label --- E
//! subgraph Backend
//!   direction LR
//! end
//! ```

use winnow::{
    Parser as _,
    combinator::opt,
    error::ErrMode,
    stream::{Location, Stream},
};

use super::{Blocks, missing_text};
use crate::{
    dialect::{Direction, invalid_direction},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{
        Expected, IResult, Input, backtrack, delimited_label, delimited_len, end_of_statement,
        fail, identifier, keyword, parse_line, split_statements, ws,
    },
};

const SHAPE_OPENERS: &[char] = &['[', '(', '{', '>'];

/// Statements that take arguments but are not checked further.
const PASSTHROUGH: &[&str] = &["style", "classDef", "class", "click", "linkStyle"];

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut blocks = Blocks::new("end");
    let mut count = 0;

    for line in lines.iter().flat_map(split_statements) {
        count += 1;
        if let Err(diagnostic) = statement(&line, &mut blocks, diagnostics) {
            diagnostics.emit(diagnostic);
        }
    }

    blocks.finish(diagnostics);
    count
}

fn statement(
    line: &Line<'_>,
    blocks: &mut Blocks,
    diagnostics: &mut DiagnosticCollector,
) -> Result<(), Diagnostic> {
    let text = line.text;

    if text == "end" {
        blocks.close(line, diagnostics);
        return Ok(());
    }
    if let Some(rest) = keyword(text, "subgraph") {
        blocks.open("subgraph", line);
        return subgraph_title(line, rest);
    }
    if let Some(rest) = keyword(text, "direction") {
        return rest
            .parse::<Direction>()
            .map(|_| ())
            .map_err(|()| invalid_direction(rest, line.span_of(rest)));
    }
    if text.starts_with("accTitle") || text.starts_with("accDescr") {
        return Ok(());
    }
    for kw in PASSTHROUGH {
        if let Some(rest) = keyword(text, kw) {
            if rest.is_empty() {
                return Err(missing_text(
                    line,
                    &format!("`{kw}`"),
                    "name the node or class the statement applies to",
                ));
            }
            return Ok(());
        }
    }

    parse_line(line, chain)
}

fn subgraph_title(line: &Line<'_>, rest: &str) -> Result<(), Diagnostic> {
    if rest.is_empty() {
        return Err(missing_text(
            line,
            "`subgraph`",
            "name the subgraph, e.g. `subgraph Backend`",
        ));
    }
    match rest.find('[') {
        Some(pos) if delimited_len(&rest[pos..]).is_none() => {
            let span = line.span_of(&rest[pos..]);
            Err(Diagnostic::error("`[` is never closed, expected `]`")
                .with_code(ErrorCode::E002)
                .with_label(span, ErrorCode::E002.description())
                .with_help("close the subgraph title on the same line"))
        }
        _ => Ok(()),
    }
}

/// `group (edge label? group)*` where a group is `node (& node)*`.
fn chain<'a>(input: &mut Input<'a>) -> IResult<()> {
    let start = input.current_token_start();
    if starts_with_edge(input.peek_finish()) {
        let op = edge(input)?;
        return fail(
            input,
            Expected::new(
                ErrorCode::E104,
                format!("connection `{op}` has no source node"),
                start,
            )
            .with_help("add a node before the arrow, e.g. `A --> B`"),
        );
    }

    node_group(input)?;
    loop {
        ws(input)?;
        let op_start = input.current_token_start();
        let Some(op) = opt(edge).parse_next(input)? else {
            break;
        };
        ws(input)?;
        opt(delimited_label(&['|'])).parse_next(input)?;
        ws(input)?;

        let rest = input.peek_finish();
        if rest.is_empty() || rest.starts_with(';') {
            return fail(
                input,
                Expected::new(
                    ErrorCode::E103,
                    format!("connection `{op}` has no target node"),
                    op_start,
                )
                .with_help("add a node after the arrow, e.g. `A --> B`"),
            );
        }
        node_group(input)?;
    }

    end_of_statement(input)
}

fn node_group(input: &mut Input<'_>) -> IResult<()> {
    node(input)?;
    loop {
        let checkpoint = input.checkpoint();
        ws(input)?;
        if !input.peek_finish().starts_with('&') {
            input.reset(&checkpoint);
            return Ok(());
        }
        input.next_token();
        ws(input)?;
        node(input)?;
    }
}

/// `id`, `id[label]`, `id((label))`, `id@{ .. }`, each optionally `:::class`.
fn node(input: &mut Input<'_>) -> IResult<()> {
    let start = input.current_token_start();
    match identifier(input) {
        Ok(_) => {}
        Err(ErrMode::Backtrack(_)) => {
            let found = input.next_token();
            return fail(
                input,
                Expected::new(
                    ErrorCode::E003,
                    match found {
                        Some(c) => format!("expected a node, found `{c}`"),
                        None => "expected a node".to_string(),
                    },
                    start,
                )
                .with_help("node ids are made of letters, digits, `_` and `-`"),
            );
        }
        Err(err) => return Err(err),
    }

    if input.peek_finish().starts_with("@{") {
        input.next_token();
        delimited_label(&['{']).parse_next(input)?;
    } else {
        opt(delimited_label(SHAPE_OPENERS)).parse_next(input)?;
    }

    if input.peek_finish().starts_with(":::") {
        input.next_slice(3);
        identifier(input)?;
    }
    Ok(())
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Byte length of the link operator at the start of `text`.
///
/// Recognizes `-->`, `---`, `-.->`, `==>`, `~~~`, `<-->`, `o--o`, `--x` and
/// their longer variants.
fn edge_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'<' | b'o' | b'x'))
        && matches!(bytes.get(1), Some(b'-' | b'=' | b'.'))
    {
        i = 1;
    }

    let body_start = i;
    while matches!(bytes.get(i), Some(b'-' | b'=' | b'.' | b'~')) {
        i += 1;
    }
    let body = &text[body_start..i];
    if body.len() < 2 || !body.contains(['-', '=', '~']) {
        return None;
    }

    match bytes.get(i) {
        Some(b'>') => i += 1,
        Some(b'o' | b'x') if !bytes.get(i + 1).is_some_and(|b| is_ident_byte(*b)) => i += 1,
        _ => {}
    }
    Some(i)
}

fn starts_with_edge(text: &str) -> bool {
    text.starts_with(['-', '=', '.', '<', '~']) && edge_len(text).is_some()
}

/// A link operator, including the inline-label forms `-- text -->`,
/// `== text ==>` and `-. text .->`.
fn edge<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let start = input.current_token_start();
    let original = input.peek_finish();
    let Some(len) = edge_len(original) else {
        return backtrack();
    };
    let op = input.next_slice(len);

    let closing = match op {
        "--" => "--",
        "==" => "==",
        "-." => ".-",
        _ => return Ok(op),
    };

    let Some(pos) = input.peek_finish().find(closing) else {
        input.finish();
        return fail(
            input,
            Expected::new(
                ErrorCode::E002,
                format!("label after `{op}` is never closed by an arrow"),
                start,
            )
            .with_help("finish the label with an arrow, e.g. `A -- text --> B`"),
        );
    };
    input.next_slice(pos);

    match edge_len(input.peek_finish()) {
        Some(len) => {
            input.next_slice(len);
            Ok(&original[..input.current_token_start() - start])
        }
        None => {
            input.finish();
            fail(
                input,
                Expected::new(ErrorCode::E105, "malformed link label", start)
                    .with_help("finish the label with an arrow, e.g. `A -- text --> B`"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{span::Span, validate::validate};

    fn codes(source: &str) -> Vec<ErrorCode> {
        validate(source)
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_edge_len() {
        assert_eq!(edge_len("-->B"), Some(3));
        assert_eq!(edge_len("---B"), Some(3));
        assert_eq!(edge_len("-.->B"), Some(4));
        assert_eq!(edge_len("==>B"), Some(3));
        assert_eq!(edge_len("<-->B"), Some(4));
        assert_eq!(edge_len("o--o B"), Some(4));
        assert_eq!(edge_len("--x B"), Some(3));
        assert_eq!(edge_len("--xylophone"), Some(2));
        assert_eq!(edge_len("~~~ B"), Some(3));
        assert_eq!(edge_len("-B"), None);
        assert_eq!(edge_len(".. B"), None);
    }

    #[test]
    fn test_valid_flowchart() {
        let source = "flowchart LR
    A[Start] --> B{Is it?}
    B -->|Yes| C[OK] & D((Done))
    B -- No --> E>Flag]
    C -.-> F[(Database)]
    F ==> G[[Sub]]
    G --- H([\"Stadium ] text\"]):::highlight
    subgraph Backend [Back end]
        direction TB
        api-gateway --> db
    end
    style A fill:#f9f
    classDef highlight fill:#ff0
    click A callback";

        let diagram = validate(source).unwrap();
        assert_eq!(diagram.statement_count(), 13);
    }

    #[test]
    fn test_semicolon_separated() {
        let diagram = validate("graph TD;A-->B;B-->C;").unwrap();
        assert_eq!(diagram.statement_count(), 2);
    }

    #[test]
    fn test_dangling_connection() {
        let source = "graph TD\nA-->";
        let err = validate(source).unwrap_err();
        let diagnostic = err.first_error().unwrap();

        assert_eq!(diagnostic.code(), Some(ErrorCode::E103));
        assert_eq!(diagnostic.message(), "connection `-->` has no target node");
        assert_eq!(diagnostic.primary_span(), Some(Span::new(10..13)));
    }

    #[test]
    fn test_dangling_after_label() {
        assert_eq!(codes("graph TD\nA -->|yes|"), vec![ErrorCode::E103]);
    }

    #[test]
    fn test_missing_source() {
        assert_eq!(codes("graph TD\n--> B"), vec![ErrorCode::E104]);
    }

    #[test]
    fn test_unclosed_shape() {
        assert_eq!(codes("graph TD\nA[Start --> B"), vec![ErrorCode::E002]);
    }

    #[test]
    fn test_unclosed_inline_label() {
        assert_eq!(codes("graph TD\nA -- no arrow B"), vec![ErrorCode::E002]);
    }

    #[test]
    fn test_missing_connection() {
        let err = validate("graph TD\nA B").unwrap_err();
        let diagnostic = err.first_error().unwrap();
        assert_eq!(diagnostic.code(), Some(ErrorCode::E003));
        assert_eq!(diagnostic.message(), "unexpected `B`");
    }

    #[test]
    fn test_blocks() {
        assert_eq!(codes("graph TD\nsubgraph One\nA-->B"), vec![ErrorCode::E106]);
        assert_eq!(codes("graph TD\nA-->B\nend"), vec![ErrorCode::E107]);
        assert_eq!(codes("graph TD\nsubgraph\nend"), vec![ErrorCode::E109]);
    }

    #[test]
    fn test_direction_statement() {
        assert_eq!(codes("graph TD\ndirection XY"), vec![ErrorCode::E102]);
    }

    #[test]
    fn test_reports_every_bad_line() {
        assert_eq!(
            codes("graph TD\nA-->\nB-->C\n--> D\nE[x"),
            vec![ErrorCode::E103, ErrorCode::E104, ErrorCode::E002]
        );
    }
}
