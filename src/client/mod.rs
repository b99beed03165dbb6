//! Client for the remote generative-language service.
//!
//! Handlers only see the [`AnalysisClient`] trait; the production
//! implementation talks to the Gemini REST API.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors returned by an [`AnalysisClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API key is not configured")]
    NotConfigured,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to {0}")]
    Connect(String),

    #[error("failed to send request: {0}")]
    Transport(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("file {name} did not become active (state: {state})")]
    FileNotReady { name: String, state: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True when the failure comes from local configuration rather than the service.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ClientError::NotConfigured)
    }
}

/// A file stored on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    /// URI used to reference the file in a prompt.
    pub uri: String,
    pub mime_type: String,
}

/// A model exposed by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

/// Turns prompts (and optionally an uploaded file) into generated text.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Generate text for a prompt, optionally referencing an uploaded file.
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&RemoteFile>,
    ) -> Result<String, ClientError>;

    /// Upload a local file so it can be referenced by [`generate`](Self::generate).
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ClientError>;

    /// Delete a previously uploaded file.
    async fn delete_file(&self, file: &RemoteFile) -> Result<(), ClientError>;

    /// List the models available to the configured credentials.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ClientError>;
}
