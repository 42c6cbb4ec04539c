//! Client for the remote description generator.
//!
//! The generator turns a natural-language prompt into a Mermaid description.
//! Its failures carry a human readable `detail` that is passed through to the
//! user unchanged.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    catalog::{DiagramKind, KindInfo},
    config::GeneratorConfig,
};

/// Longest prompt the generator accepts, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("prompt must be between 1 and {MAX_PROMPT_CHARS} characters, got {0}")]
    InvalidPrompt(usize),

    /// The generator answered with an error; `detail` is its message.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("could not reach the generator: {0}")]
    Transport(String),

    #[error("unexpected generator response: {0}")]
    Decode(String),
}

/// Body of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    diagram_type: DiagramKind,
}

impl GenerationRequest {
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidPrompt`] for an empty or overlong prompt.
    pub fn new(prompt: impl Into<String>, diagram_type: DiagramKind) -> Result<Self, GenerationError> {
        let prompt = prompt.into();
        let length = prompt.chars().count();
        if length == 0 || length > MAX_PROMPT_CHARS {
            return Err(GenerationError::InvalidPrompt(length));
        }
        Ok(Self {
            prompt,
            diagram_type,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn diagram_type(&self) -> DiagramKind {
        self.diagram_type
    }
}

/// A generated description, as returned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedDiagram {
    pub id: String,
    pub mermaid_code: String,
    pub diagram_type: String,
    pub prompt: String,
    pub created_at: String,
}

impl GeneratedDiagram {
    /// The kind the description was generated for, if the generator named a known one.
    pub fn kind(&self) -> Option<DiagramKind> {
        self.diagram_type.parse().ok()
    }
}

/// HTTP client for the generator API.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGenerator {
    /// # Errors
    ///
    /// Returns [`GenerationError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Ask the generator for a description.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedDiagram, GenerationError> {
        let url = format!("{}/diagrams/generate", self.base_url);
        debug!(url = url.as_str(), kind:% = request.diagram_type; "Requesting diagram");

        let response = self.http.post(&url).json(request).send().await;
        let diagram: GeneratedDiagram = read_json(response).await?;

        debug!(id = diagram.id.as_str(), bytes = diagram.mermaid_code.len(); "Diagram generated");
        Ok(diagram)
    }

    /// Fetch the generator's diagram-kind catalog.
    pub async fn kinds(&self) -> Result<Vec<KindInfo>, GenerationError> {
        let url = format!("{}/diagram-types", self.base_url);
        debug!(url = url.as_str(); "Fetching diagram kinds");
        read_json(self.http.get(&url).send().await).await
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Result<reqwest::Response>,
) -> Result<T, GenerationError> {
    let response = response.map_err(|err| GenerationError::Transport(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| GenerationError::Transport(err.to_string()))?;

    if !status.is_success() {
        let err = GenerationError::Rejected {
            status: status.as_u16(),
            detail: error_detail(status.as_u16(), &body),
        };
        warn!(status = status.as_u16(), err:% = err; "Generator rejected request");
        return Err(err);
    }

    serde_json::from_str(&body).map_err(|err| GenerationError::Decode(err.to_string()))
}

/// Extract the `detail` message from an error body.
///
/// A string detail is returned verbatim; structured details are returned as
/// compact JSON. Bodies without a detail fall back to the HTTP status.
fn error_detail(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|mut json| json.get_mut("detail").map(Value::take));
    match detail {
        Some(Value::String(message)) => message,
        Some(Value::Null) | None => format!("generator returned HTTP {status}"),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_length_is_checked() {
        assert_eq!(
            GenerationRequest::new("", DiagramKind::Pie),
            Err(GenerationError::InvalidPrompt(0))
        );
        assert!(GenerationRequest::new("é".repeat(MAX_PROMPT_CHARS), DiagramKind::Pie).is_ok());
        assert_eq!(
            GenerationRequest::new("a".repeat(MAX_PROMPT_CHARS + 1), DiagramKind::Pie),
            Err(GenerationError::InvalidPrompt(MAX_PROMPT_CHARS + 1))
        );
    }

    #[test]
    fn test_request_json_shape() {
        let request = GenerationRequest::new("A login flow", DiagramKind::GitGraph).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"prompt": "A login flow", "diagram_type": "gitGraph"})
        );
    }

    #[test]
    fn test_generated_diagram_decodes() {
        let diagram: GeneratedDiagram = serde_json::from_str(
            r#"{
                "id": "507f1f77bcf86cd799439011",
                "mermaid_code": "graph TD\n  A[Start] --> B[Login]",
                "diagram_type": "flowchart",
                "prompt": "Create a login flow",
                "created_at": "2024-01-01T12:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(diagram.kind(), Some(DiagramKind::Flowchart));
        assert!(diagram.mermaid_code.starts_with("graph TD"));
    }

    #[test]
    fn test_error_detail_is_verbatim() {
        assert_eq!(
            error_detail(500, r#"{"detail": "Ollama is not running"}"#),
            "Ollama is not running"
        );
        assert_eq!(error_detail(502, "Bad Gateway"), "generator returned HTTP 502");
        assert_eq!(
            error_detail(422, r#"{"detail": [{"msg": "too long"}]}"#),
            r#"[{"msg":"too long"}]"#
        );
    }

    #[test]
    fn test_rejected_displays_detail_only() {
        let err = GenerationError::Rejected {
            status: 500,
            detail: "model timed out".to_string(),
        };
        assert_eq!(err.to_string(), "model timed out");
    }
}
