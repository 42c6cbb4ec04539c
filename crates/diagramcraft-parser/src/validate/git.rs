//! Git graph statements.
//!
//! Unlike the other dialects, a git graph carries state between statements:
//! the set of known branches and the branch currently checked out.

use std::collections::HashSet;

use log::trace;
use winnow::{
    Parser as _,
    combinator::{alt, opt},
    stream::{Location, Stream},
    token::{take_till, take_while},
};

use super::{missing_text, unrecognized};
use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::Line,
    syntax::{Expected, IResult, Input, end_of_statement, fail, keyword, parse_line, quoted, ws},
};

const MAIN_BRANCH: &str = "main";

const COMMIT_TYPES: &[&str] = &["NORMAL", "REVERSE", "HIGHLIGHT"];

/// Branch bookkeeping while walking the statements.
#[derive(Debug)]
struct Repository<'a> {
    branches: HashSet<&'a str>,
    current: &'a str,
}

impl<'a> Repository<'a> {
    fn new() -> Self {
        Self {
            branches: HashSet::from([MAIN_BRANCH]),
            current: MAIN_BRANCH,
        }
    }

    fn branch(&mut self, line: &Line<'a>, name: &'a str) -> Result<(), Diagnostic> {
        if !self.branches.insert(name) {
            return Err(Diagnostic::error(format!("branch `{name}` already exists"))
                .with_code(ErrorCode::E201)
                .with_label(line.span_of(name), ErrorCode::E201.description())
                .with_help("switch to it with `checkout` instead"));
        }
        self.current = name;
        Ok(())
    }

    fn checkout(&mut self, line: &Line<'a>, name: &'a str) -> Result<(), Diagnostic> {
        self.require(line, name)?;
        self.current = name;
        Ok(())
    }

    fn merge(&self, line: &Line<'a>, name: &'a str) -> Result<(), Diagnostic> {
        self.require(line, name)?;
        if name == self.current {
            return Err(Diagnostic::error(format!("cannot merge `{name}` into itself"))
                .with_code(ErrorCode::E202)
                .with_label(line.span_of(name), ErrorCode::E202.description())
                .with_help("check out the target branch before merging"));
        }
        Ok(())
    }

    fn require(&self, line: &Line<'a>, name: &'a str) -> Result<(), Diagnostic> {
        if self.branches.contains(name) {
            return Ok(());
        }
        Err(Diagnostic::error(format!("unknown branch `{name}`"))
            .with_code(ErrorCode::E200)
            .with_label(line.span_of(name), ErrorCode::E200.description())
            .with_help("create the branch first with `branch`"))
    }
}

pub(super) fn check(lines: &[Line<'_>], diagnostics: &mut DiagnosticCollector) -> usize {
    let mut repository = Repository::new();
    for line in lines {
        if let Err(diagnostic) = statement(line, &mut repository) {
            diagnostics.emit(diagnostic);
        }
    }
    trace!(branches = repository.branches.len(); "Checked git graph");
    lines.len()
}

fn statement<'a>(line: &Line<'a>, repository: &mut Repository<'a>) -> Result<(), Diagnostic> {
    let text = line.text;
    let word = text.split_whitespace().next().unwrap_or_default();
    let rest = keyword(text, word).unwrap_or_default();
    let tail = line.tail(text.len() - rest.len());

    match word {
        "commit" => parse_line(&tail, attributes).map(|_| ()),
        "branch" => {
            let name = named(line, &tail, word)?;
            repository.branch(line, name)
        }
        "checkout" | "switch" => {
            let name = named(line, &tail, word)?;
            repository.checkout(line, name)
        }
        "merge" => {
            let name = named(line, &tail, word)?;
            repository.merge(line, name)
        }
        "cherry-pick" => {
            let keys = parse_line(&tail, attributes)?;
            if keys.contains(&"id") {
                Ok(())
            } else {
                Err(missing_text(
                    line,
                    "`cherry-pick`",
                    "name the commit to pick, e.g. `cherry-pick id: \"A\"`",
                ))
            }
        }
        _ if text.starts_with("accTitle") || text.starts_with("accDescr") => Ok(()),
        _ => Err(unrecognized(
            line,
            "expected `commit`, `branch`, `checkout`, `merge` or `cherry-pick`",
        )),
    }
}

/// Branch name followed by optional attributes.
fn named<'a>(line: &Line<'a>, tail: &Line<'a>, word: &str) -> Result<&'a str, Diagnostic> {
    if tail.text.is_empty() {
        return Err(missing_text(
            line,
            &format!("`{word}`"),
            "name the branch, e.g. `branch develop`",
        ));
    }
    parse_line(tail, |input: &mut Input<'a>| -> IResult<&'a str> {
        let name = alt((quoted, take_till(1.., char::is_whitespace))).parse_next(input)?;
        attributes(input)?;
        Ok(name)
    })
}

fn attribute_key<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

/// `key: value` pairs; returns the keys seen.
fn attributes<'a>(input: &mut Input<'a>) -> IResult<Vec<&'a str>> {
    let mut keys = Vec::new();
    loop {
        ws(input)?;
        if input.eof_offset() == 0 {
            return Ok(keys);
        }

        let start = input.current_token_start();
        let Some(key) = opt(attribute_key).parse_next(input)? else {
            return end_of_statement(input).map(|()| keys);
        };
        if !matches!(key, "id" | "tag" | "msg" | "type" | "order" | "parent") {
            input.finish();
            return fail(
                input,
                Expected::new(
                    ErrorCode::E105,
                    format!("unknown attribute `{key}`"),
                    start,
                )
                .with_help("attributes are `id`, `tag`, `msg`, `type`, `order` and `parent`"),
            );
        }
        ws(input)?;
        if input.next_token() != Some(':') {
            return fail(
                input,
                Expected::new(ErrorCode::E105, format!("expected `:` after `{key}`"), start),
            );
        }
        ws(input)?;

        let value_start = input.current_token_start();
        let value = alt((quoted, take_till(1.., char::is_whitespace))).parse_next(input)?;
        if key == "type" && !COMMIT_TYPES.contains(&value) {
            return fail(
                input,
                Expected::new(
                    ErrorCode::E105,
                    format!("unknown commit type `{value}`"),
                    value_start,
                )
                .with_help("use `NORMAL`, `REVERSE` or `HIGHLIGHT`"),
            );
        }
        if key == "order" && value.parse::<u32>().is_err() {
            return fail(
                input,
                Expected::new(
                    ErrorCode::E108,
                    format!("`{value}` is not a valid order"),
                    value_start,
                ),
            );
        }
        keys.push(key);
    }
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
    fn test_valid_git_graph() {
        let source = "gitGraph
    commit id: \"init\"
    branch develop order: 1
    commit tag: \"v0.1\" type: HIGHLIGHT
    checkout main
    merge develop
    branch \"feature/login\"
    commit msg: \"wip\"
    switch develop
    cherry-pick id: \"init\"";

        assert_eq!(validate(source).unwrap().statement_count(), 9);
    }

    #[test]
    fn test_unknown_branch() {
        let err = validate("gitGraph\ncommit\ncheckout develop").unwrap_err();
        let diagnostic = err.first_error().unwrap();
        assert_eq!(diagnostic.code(), Some(ErrorCode::E200));
        assert_eq!(diagnostic.message(), "unknown branch `develop`");
    }

    #[test]
    fn test_branch_rules() {
        assert_eq!(
            codes("gitGraph\nbranch develop\nbranch develop"),
            vec![ErrorCode::E201]
        );
        assert_eq!(codes("gitGraph\nbranch develop\nmerge develop"), vec![ErrorCode::E202]);
        assert_eq!(codes("gitGraph\nmerge hotfix"), vec![ErrorCode::E200]);
        assert_eq!(codes("gitGraph\nbranch"), vec![ErrorCode::E109]);
    }

    #[test]
    fn test_attributes() {
        assert_eq!(codes("gitGraph\ncommit type: SIDEWAYS"), vec![ErrorCode::E105]);
        assert_eq!(codes("gitGraph\ncommit colour: \"red\""), vec![ErrorCode::E105]);
        assert_eq!(codes("gitGraph\ncherry-pick tag: \"x\""), vec![ErrorCode::E109]);
        assert_eq!(codes("gitGraph\npush origin"), vec![ErrorCode::E105]);
    }
}
