//! Configuration types for rendering, export and generation.
//!
//! All types implement [`serde::Deserialize`] with defaults for every field,
//! so an empty or partial configuration file is valid. Configuration is read
//! once at startup and handed by value to the engine, exporter and generator.
//!
//! # Example
//!
//! ```
//! # use diagramcraft::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.export().scale(), 2.0);
//! assert!(config.export().background_color().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    render: RenderConfig,

    #[serde(default)]
    export: ExportConfig,

    #[serde(default)]
    generator: GeneratorConfig,
}

impl AppConfig {
    pub fn new(render: RenderConfig, export: ExportConfig, generator: GeneratorConfig) -> Self {
        Self {
            render,
            export,
            generator,
        }
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    pub fn generator(&self) -> &GeneratorConfig {
        &self.generator
    }
}

/// Settings for the Mermaid engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font family written into the SVG theme.
    font_family: String,

    /// Theme background, as a CSS color string.
    background_color: Option<String>,

    /// Upper bound for one validate or render call, in milliseconds.
    timeout_ms: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            background_color: None,
            timeout_ms: None,
        }
    }
}

impl RenderConfig {
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Returns the parsed theme background, or `None` to keep the theme's own.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured string is not a CSS color.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_deref()
            .map(Color::new)
            .transpose()
            .map_err(|err| format!("Invalid render background color in config: {err}"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map(|limit| limit.as_millis() as u64);
        self
    }
}

/// Settings for source and raster artifacts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default raster upscale factor.
    scale: f32,

    /// Opaque canvas fill behind the raster image.
    background_color: String,

    /// Largest allowed canvas side, in pixels, after scaling.
    max_dimension: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background_color: "#1e1e2e".to_string(),
            max_dimension: 8192,
        }
    }
}

impl ExportConfig {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the parsed canvas background.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured string is not a CSS color.
    pub fn background_color(&self) -> Result<Color, String> {
        Color::new(&self.background_color)
            .map_err(|err| format!("Invalid export background color in config: {err}"))
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}

/// Settings for the remote description generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    base_url: String,
    timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_secs: 240,
        }
    }
}

impl GeneratorConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.render().font_family(), "sans-serif");
        assert_eq!(config.render().timeout(), None);
        assert_eq!(config.export().scale(), 2.0);
        assert_eq!(config.export().max_dimension(), 8192);
        assert_eq!(
            config.export().background_color().unwrap().to_rgba8(),
            [0x1e, 0x1e, 0x2e, 0xff]
        );
        assert_eq!(config.generator().base_url(), "http://localhost:8000/api/v1");
        assert_eq!(config.generator().timeout(), Duration::from_secs(240));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_str(
            r##"{"render": {"timeout_ms": 1500}, "export": {"scale": 3.0}}"##,
        )
        .unwrap();

        assert_eq!(config.render().timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.render().font_family(), "sans-serif");
        assert_eq!(config.export().scale(), 3.0);
        assert_eq!(config.export().max_dimension(), 8192);
    }

    #[test]
    fn test_invalid_background() {
        let config: AppConfig =
            serde_json::from_str(r#"{"render": {"background_color": "nope"}}"#).unwrap();
        let err = config.render().background_color().unwrap_err();
        assert!(err.starts_with("Invalid render background color in config"));
    }
}
