//! # DiagramCraft Parser
//!
//! Classification and parse-only validation of generated diagram
//! descriptions. Nothing here lays out or draws a diagram; the validator
//! answers one question: will this Mermaid source parse?
//!
//! ## Usage
//!
//! ```
//! use diagramcraft_parser::{DescriptionKind, Dialect, ParseError, classify, validate};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "sequenceDiagram\n    Alice->>Bob: Hello";
//!     assert_eq!(classify(source), DescriptionKind::Dsl);
//!
//!     let diagram = validate(source)?;
//!     assert_eq!(diagram.dialect(), Dialect::Sequence);
//!     Ok(())
//! }
//! ```

mod classify;
mod dialect;
pub mod error;
mod lines;
mod span;
mod syntax;
mod validate;

pub use classify::{DOCUMENT_MARKERS, DescriptionKind, classify};
pub use dialect::{Dialect, Direction};
pub use error::ParseError;
pub use span::Span;
pub use validate::{ValidatedDiagram, detect_dialect, validate};
