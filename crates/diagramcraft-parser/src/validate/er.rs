//! Entity relationship diagram statements.
//!
//! ```text
//! CUSTOMER ||--o{ ORDER : places
//! ORDER {
//!     string id PK
//! }
//! ```

use winnow::{
    Parser as _,
    combinator::{alt, opt},
    stream::{Location, Stream},
    token::take_while,
};

use super::{Blocks, unrecognized};
use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{
        Expected, IResult, Input, delimited_label, end_of_statement, fail, identifier, parse_line,
        quoted, ws,
    },
};

const RELATION_HELP: &str = "expected a relationship such as `CUSTOMER ||--o{ ORDER : places`";

const LEFT_CARDINALITY: &[&str] = &["|o", "||", "}o", "}|"];
const RIGHT_CARDINALITY: &[&str] = &["o|", "||", "o{", "|{"];

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut blocks = Blocks::new("}");
    for line in lines {
        let text = line.text;
        if text == "}" {
            blocks.close(line, diagnostics);
            continue;
        }
        let result = if blocks.depth() > 0 {
            attribute(line)
        } else if text.starts_with("accTitle") || text.starts_with("accDescr") {
            Ok(())
        } else {
            parse_line(line, statement).map(|opens| {
                if opens {
                    blocks.open("entity", line);
                }
            })
        };
        if let Err(diagnostic) = result {
            diagnostics.emit(diagnostic);
        }
    }
    blocks.finish(diagnostics);
    lines.len()
}

/// `type name [PK|FK|UK, ..] ["comment"]`
fn attribute(line: &Line<'_>) -> Result<(), Diagnostic> {
    let mut words = line.text.split_whitespace();
    match (words.next(), words.next()) {
        (Some(_), Some(name)) if !name.starts_with('"') => Ok(()),
        _ => Err(unrecognized(
            line,
            "attributes need a type and a name, e.g. `string name PK`",
        )),
    }
}

fn entity<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let name = alt((quoted, identifier)).parse_next(input)?;
    opt(delimited_label(&['['])).parse_next(input)?;
    Ok(name)
}

fn is_cardinality(op: &str) -> bool {
    op.len() == 6
        && LEFT_CARDINALITY.contains(&&op[..2])
        && matches!(&op[2..4], "--" | "..")
        && RIGHT_CARDINALITY.contains(&&op[4..])
}

fn relationship_op<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., ['|', 'o', '}', '{', '-', '.']).parse_next(input)
}

/// An entity, an entity block opener or a relationship; returns whether a block opens.
fn statement(input: &mut Input<'_>) -> IResult<bool> {
    let start = input.current_token_start();
    if input.peek_finish().starts_with(['|', '}']) {
        let op = relationship_op(input)?;
        return fail(
            input,
            Expected::new(
                ErrorCode::E104,
                format!("relationship `{op}` has no source entity"),
                start,
            )
            .with_help(RELATION_HELP),
        );
    }

    if entity(input).is_err() {
        input.finish();
        return fail(
            input,
            Expected::new(ErrorCode::E105, "unrecognized statement", start).with_help(RELATION_HELP),
        );
    }
    ws(input)?;

    if input.peek_finish().starts_with('{') {
        input.next_token();
        ws(input)?;
        if input.peek_finish().starts_with('}') {
            input.next_token();
            end_of_statement(input)?;
            return Ok(false);
        }
        end_of_statement(input)?;
        return Ok(true);
    }
    if input.eof_offset() == 0 {
        return Ok(false);
    }

    let op_start = input.current_token_start();
    let op = relationship_op(input)?;
    if !is_cardinality(op) {
        return fail(
            input,
            Expected::new(
                ErrorCode::E105,
                format!("invalid relationship `{op}`"),
                op_start,
            )
            .with_help("use cardinalities such as `||--o{`, `}|..|{` or `|o--||`"),
        );
    }
    ws(input)?;

    let rest = input.peek_finish();
    if rest.is_empty() || rest.starts_with(':') {
        return fail(
            input,
            Expected::new(
                ErrorCode::E103,
                format!("relationship `{op}` has no target entity"),
                op_start,
            )
            .with_help(RELATION_HELP),
        );
    }
    entity(input)?;
    ws(input)?;

    if !input.peek_finish().starts_with(':') {
        input.finish();
        return fail(
            input,
            Expected::new(ErrorCode::E109, "relationship is missing its label", start)
                .with_help("add a label after a colon, e.g. `: places`"),
        );
    }
    input.finish();
    Ok(false)
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
    fn test_valid_er_diagram() {
        let source = "erDiagram
    CUSTOMER ||--o{ ORDER : places
    ORDER ||--|{ LINE-ITEM : contains
    CUSTOMER }|..|{ DELIVERY-ADDRESS : uses
    CUSTOMER {
        string name PK
        string email \"login\"
    }
    PRODUCT
    p[\"Product alias\"] |o--o| ORDER : \"\"";

        assert_eq!(validate(source).unwrap().statement_count(), 9);
    }

    #[test]
    fn test_relationship_errors() {
        let err = validate("erDiagram\nCUSTOMER ||--o{").unwrap_err();
        assert_eq!(
            err.first_error().unwrap().message(),
            "relationship `||--o{` has no target entity"
        );
        assert_eq!(codes("erDiagram\n||--o{ ORDER : x"), vec![ErrorCode::E104]);
        assert_eq!(codes("erDiagram\nA ||--> B : x"), vec![ErrorCode::E105]);
        assert_eq!(codes("erDiagram\nA ||--o{ B"), vec![ErrorCode::E109]);
    }

    #[test]
    fn test_entity_blocks() {
        assert_eq!(codes("erDiagram\nA {\nstring id"), vec![ErrorCode::E106]);
        assert_eq!(codes("erDiagram\nA {\nid\n}"), vec![ErrorCode::E105]);
    }
}
