//! Diagnostics produced while validating a diagram description.
//!
//! Validation never stops at the first problem inside a statement list: every
//! statement is checked and the findings are accumulated by a
//! [`DiagnosticCollector`], then returned together as a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use diagramcraft_parser::error::{Diagnostic, ErrorCode};
//! # use diagramcraft_parser::Span;
//!
//! let diag = Diagnostic::error("connection `-->` has no target node")
//!     .with_code(ErrorCode::E103)
//!     .with_label(Span::new(9..12), "dangling connection")
//!     .with_help("add a node after the arrow, e.g. `A --> B`");
//!
//! assert_eq!(diag.to_string(), "error[E103]: connection `-->` has no target node");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
