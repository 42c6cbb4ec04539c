//! Pie chart statements.

use winnow::{
    Parser as _,
    stream::{Location, Stream},
    token::take_till,
};

use super::unrecognized;
use crate::{
    error::{DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{Expected, IResult, Input, end_of_statement, fail, parse_line, quoted, ws},
};

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    for line in lines {
        let text = line.text;
        let result = if text.starts_with('"') {
            parse_line(line, slice)
        } else if ["title", "showData", "accTitle", "accDescr"]
            .iter()
            .any(|kw| text.starts_with(kw))
        {
            Ok(())
        } else {
            Err(unrecognized(line, "expected a slice such as `\"Dogs\" : 42`"))
        };
        if let Err(diagnostic) = result {
            diagnostics.emit(diagnostic);
        }
    }
    lines.len()
}

fn number_token<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_till(0.., [';', ' ', '\t']).parse_next(input)
}

/// `"Label" : value`
fn slice(input: &mut Input<'_>) -> IResult<()> {
    quoted(input)?;
    ws(input)?;

    let start = input.current_token_start();
    if !input.peek_finish().starts_with(':') {
        input.finish();
        return fail(
            input,
            Expected::new(ErrorCode::E105, "expected `:` after the slice label", start)
                .with_help("separate label and value with a colon, e.g. `\"Dogs\" : 42`"),
        );
    }
    input.next_token();
    ws(input)?;

    let value_start = input.current_token_start();
    let value = number_token(input)?;
    let valid = value
        .parse::<f64>()
        .is_ok_and(|number| number.is_finite() && number >= 0.0);
    if !valid {
        let message = if value.is_empty() {
            "slice is missing its value".to_string()
        } else {
            format!("`{value}` is not a valid slice value")
        };
        return fail(
            input,
            Expected::new(ErrorCode::E108, message, value_start)
                .with_help("use a non-negative number"),
        );
    }
    end_of_statement(input)
}
