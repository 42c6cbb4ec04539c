//! Stable codes for validation diagnostics.
//!
//! Codes are grouped by the kind of problem:
//! - `E0xx` - lexical problems inside a single statement
//! - `E1xx` - structural problems (headers, connections, blocks)
//! - `E2xx` - semantic problems that need state across statements

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexical (E0xx)
    // =========================================================================
    /// A quoted string was opened but never closed on the same line.
    E001,

    /// A label delimiter such as `[`, `(`, `{` or `|` is not closed.
    E002,

    /// A character that cannot start any statement element.
    E003,

    // =========================================================================
    // Structural (E1xx)
    // =========================================================================
    /// The description has no diagram header.
    E100,

    /// The header names a diagram type the validator does not know.
    E101,

    /// A flowchart or `direction` statement names an invalid direction.
    E102,

    /// A connection operator with nothing after it, e.g. `A -->`.
    E103,

    /// A connection operator with nothing before it, e.g. `--> B`.
    E104,

    /// A statement that does not match any form of the current dialect.
    E105,

    /// A block (`subgraph`, `loop`, `state X {`, ...) is never closed.
    E106,

    /// An `end` or `}` without an open block.
    E107,

    /// A value that must be numeric is not a valid number.
    E108,

    /// A statement that requires label text (`: text`) is missing it.
    E109,

    // =========================================================================
    // Semantic (E2xx)
    // =========================================================================
    /// A git graph statement references a branch that was never created.
    E200,

    /// A git graph `branch` statement re-creates an existing branch.
    E201,

    /// A git graph `merge` merges the current branch into itself.
    E202,

    /// A mindmap has more than one root node.
    E203,

    /// A clause such as `else` or `and` appears outside a block that allows it.
    E204,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E107 => "E107",
            ErrorCode::E108 => "E108",
            ErrorCode::E109 => "E109",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
        }
    }

    /// Short description used as the default primary label text.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string",
            ErrorCode::E002 => "unbalanced delimiter",
            ErrorCode::E003 => "unexpected character",
            ErrorCode::E100 => "missing diagram header",
            ErrorCode::E101 => "unknown diagram type",
            ErrorCode::E102 => "invalid direction",
            ErrorCode::E103 => "dangling connection",
            ErrorCode::E104 => "connection without source",
            ErrorCode::E105 => "malformed statement",
            ErrorCode::E106 => "unclosed block",
            ErrorCode::E107 => "unexpected block terminator",
            ErrorCode::E108 => "invalid number",
            ErrorCode::E109 => "missing label text",
            ErrorCode::E200 => "unknown branch",
            ErrorCode::E201 => "duplicate branch",
            ErrorCode::E202 => "self merge",
            ErrorCode::E203 => "multiple mindmap roots",
            ErrorCode::E204 => "clause outside its block",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E103.to_string(), "E103");
        assert_eq!(ErrorCode::E204.to_string(), "E204");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E103.description(), "dangling connection");
        assert_eq!(ErrorCode::E200.description(), "unknown branch");
    }
}
