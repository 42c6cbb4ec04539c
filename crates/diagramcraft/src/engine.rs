//! Seams between the session controller and the diagram engine.
//!
//! The controller only needs two asynchronous calls: a parse-only
//! [`Validator::validate`] and a [`Renderer::render`] that produces SVG.
//! [`MermaidEngine`] implements both; tests substitute scripted engines.

mod mermaid;

use std::{fmt, future::Future, sync::Arc};

use rand::{Rng, distr::Alphanumeric};

use crate::{
    description::Version,
    outcome::{RenderError, SyntaxError},
};

pub use mermaid::MermaidEngine;

/// Number of random characters after the `mermaid-` prefix.
const HANDLE_SUFFIX_LEN: usize = 10;

/// Caller-unique identifier for one render call.
///
/// Ids inside the produced SVG are scoped with it, so two renders embedded
/// in the same document never share an element id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderHandle(String);

impl RenderHandle {
    /// A fresh handle: `mermaid-` followed by random lowercase alphanumerics.
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(HANDLE_SUFFIX_LEN)
            .map(|byte| char::from(byte).to_ascii_lowercase())
            .collect();
        Self(format!("mermaid-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse-only check of a diagram description.
///
/// Implementations must convert every failure of the underlying parser into
/// a [`SyntaxError`]; nothing may escape as a panic. Calls are independent
/// and may run concurrently.
pub trait Validator: Send + Sync + 'static {
    fn validate(
        &self,
        source: Arc<str>,
        version: Version,
    ) -> impl Future<Output = Result<(), SyntaxError>> + Send;
}

/// Compiles a validated description into an SVG document.
pub trait Renderer: Send + Sync + 'static {
    fn render(
        &self,
        source: Arc<str>,
        handle: RenderHandle,
        version: Version,
    ) -> impl Future<Output = Result<String, RenderError>> + Send;
}
