//! DiagramCraft - live rendering and export of generated Mermaid diagrams.
//!
//! A [`RenderSession`] holds the description being edited and turns every
//! edit into a validate-then-render run. Only the outcome for the newest
//! edit is ever published; results of superseded runs are dropped.
//!
//! # Examples
//!
//! ```rust,no_run
//! use diagramcraft::{MermaidEngine, RenderSession, Stage, config::AppConfig};
//!
//! # async fn demo() -> Result<(), diagramcraft::DiagramcraftError> {
//! let config = AppConfig::default();
//! let session = RenderSession::new(MermaidEngine::new(config.render())?, &config)?;
//!
//! let version = session.edit("graph TD\nA-->B");
//! let snapshot = session.settled(version).await;
//! assert_eq!(snapshot.stage(), Stage::Rendered);
//!
//! let png = session.export_raster(None).await?;
//! std::fs::write(png.file_name(), png.bytes())?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod color;
pub mod config;
pub mod engine;
pub mod generation;

mod description;
mod error;
mod export;
mod outcome;
mod session;

pub use diagramcraft_parser::{DescriptionKind, classify};

pub use catalog::{DiagramKind, KindInfo, catalog};
pub use description::{DiagramDescription, Version};
pub use engine::{MermaidEngine, RenderHandle, Renderer, Validator};
pub use error::DiagramcraftError;
pub use export::{
    Artifact, ExportError, ExportRequest, Exporter, RASTER_FILE_NAME, SOURCE_FILE_NAME,
};
pub use generation::{GeneratedDiagram, GenerationError, GenerationRequest, HttpGenerator};
pub use outcome::{RenderError, RenderOutcome, Snapshot, Stage, SyntaxError};
pub use session::RenderSession;
