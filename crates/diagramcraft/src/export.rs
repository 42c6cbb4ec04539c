//! Source and raster artifacts.
//!
//! Source export always succeeds: it is the buffer text as UTF-8. Raster
//! export draws an already rendered SVG onto an opaque canvas and encodes it
//! as PNG.

mod raster;

use std::sync::Arc;

use log::info;
use thiserror::Error;
use tokio::task;

use crate::{color::Color, config::ExportConfig, outcome::Stage};

/// File name of every source artifact.
pub const SOURCE_FILE_NAME: &str = "diagram.mmd";

/// File name of every raster artifact.
pub const RASTER_FILE_NAME: &str = "diagram.png";

/// A downloadable file produced by the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    file_name: &'static str,
    media_type: &'static str,
    bytes: Vec<u8>,
}

impl Artifact {
    /// Suggested file name, e.g. `diagram.png`.
    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportRequest {
    /// The description text.
    Source,
    /// The current rendering as PNG, upscaled by `scale`.
    Raster { scale: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("nothing to export: the diagram is not rendered ({state})")]
    NotRendered { state: Stage },

    #[error("invalid raster scale {0}: expected a positive finite number")]
    InvalidScale(f32),

    #[error("rendered SVG could not be parsed: {0}")]
    InvalidSvg(String),

    #[error("canvas size {width}x{height} is outside 1..={max} pixels per side")]
    CanvasSize { width: u64, height: u64, max: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Turns descriptions and renderings into [`Artifact`]s.
#[derive(Debug, Clone)]
pub struct Exporter {
    background: Color,
    max_dimension: u32,
    default_scale: f32,
}

impl Exporter {
    /// # Errors
    ///
    /// Returns an error if the configured background is not a CSS color.
    pub fn new(config: &ExportConfig) -> Result<Self, String> {
        Ok(Self {
            background: config.background_color()?.opaque(),
            max_dimension: config.max_dimension(),
            default_scale: config.scale(),
        })
    }

    /// The configured raster scale.
    pub fn default_scale(&self) -> f32 {
        self.default_scale
    }

    /// The description text as a UTF-8 artifact.
    pub fn source(&self, text: &str) -> Artifact {
        Artifact {
            file_name: SOURCE_FILE_NAME,
            media_type: "text/plain; charset=utf-8",
            bytes: text.as_bytes().to_vec(),
        }
    }

    /// Rasterize `svg` at `scale` onto the configured background.
    ///
    /// The conversion runs on the blocking pool; every temporary buffer is
    /// dropped before this returns, on success and on failure.
    pub async fn raster(&self, svg: Arc<str>, scale: f32) -> Result<Artifact, ExportError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ExportError::InvalidScale(scale));
        }

        let canvas = raster::Canvas {
            scale,
            background: self.background.to_rgba8(),
            max_dimension: self.max_dimension,
        };
        let png = task::spawn_blocking(move || raster::svg_to_png(&svg, &canvas))
            .await
            .map_err(|err| ExportError::Encode(format!("rasterizer stopped unexpectedly: {err}")))??;

        info!(file = RASTER_FILE_NAME, bytes = png.len(), scale = scale; "Raster exported");
        Ok(Artifact {
            file_name: RASTER_FILE_NAME,
            media_type: "image/png",
            bytes: png,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20"><rect x="0" y="0" width="5" height="5" fill="#ff0000"/></svg>"##;

    fn exporter() -> Exporter {
        Exporter::new(&ExportConfig::default()).unwrap()
    }

    #[test]
    fn test_source_artifact() {
        let artifact = exporter().source("graph TD\nA-->B");

        assert_eq!(artifact.file_name(), "diagram.mmd");
        assert_eq!(artifact.bytes(), b"graph TD\nA-->B");
    }

    #[tokio::test]
    async fn test_artifact_names_ignore_config_overrides() {
        let config: ExportConfig = serde_json::from_str(
            r#"{"source_file_name": "diagram.txt", "raster_file_name": "diagram.txt"}"#,
        )
        .unwrap();
        let exporter = Exporter::new(&config).unwrap();

        assert_eq!(exporter.source("pie").file_name(), "diagram.mmd");
        let raster = exporter.raster(SQUARE.into(), 1.0).await.unwrap();
        assert_eq!(raster.file_name(), "diagram.png");
    }

    #[test]
    fn test_empty_source_artifact() {
        let artifact = exporter().source("");
        assert!(artifact.bytes().is_empty());
    }

    #[tokio::test]
    async fn test_raster_artifact_is_png() {
        let artifact = exporter().raster(SQUARE.into(), 2.0).await.unwrap();

        assert_eq!(artifact.file_name(), "diagram.png");
        assert_eq!(artifact.media_type(), "image/png");
        assert!(artifact.bytes().starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[tokio::test]
    async fn test_raster_rejects_bad_scale() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = exporter().raster(SQUARE.into(), scale).await.unwrap_err();
            assert!(matches!(err, ExportError::InvalidScale(_)));
        }
    }

    #[tokio::test]
    async fn test_raster_rejects_invalid_svg() {
        let err = exporter().raster("<svg".into(), 2.0).await.unwrap_err();
        assert!(matches!(err, ExportError::InvalidSvg(_)));
    }

    #[test]
    fn test_not_rendered_message() {
        let err = ExportError::NotRendered {
            state: Stage::Validating,
        };
        assert_eq!(
            err.to_string(),
            "nothing to export: the diagram is not rendered (validating)"
        );
    }
}
