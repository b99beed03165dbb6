//! Gemini REST API client.
//!
//! Implements [`AnalysisClient`] on top of the `generateContent`, Files
//! and Models endpoints of the Generative Language API.

use super::{AnalysisClient, ClientError, ModelInfo, RemoteFile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Delay between file state checks after an upload.
    pub file_poll_interval: Duration,
    /// Number of state checks before giving up on a processing file.
    pub file_poll_attempts: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            model_name: "gemini-1.5-flash".to_string(),
            temperature: 0.4,
            timeout_seconds: 120,
            file_poll_interval: Duration::from_secs(1),
            file_poll_attempts: 10,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// File resource as returned by the Files API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Client for the Gemini REST API.
pub struct GeminiClient {
    config: GeminiConfig,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client. A missing key is accepted; calls then fail with
    /// [`ClientError::NotConfigured`].
    pub fn new(config: GeminiConfig, api_key: Option<String>) -> Result<Self, ClientError> {
        info!(
            "Initializing Gemini client with model {} at {}",
            config.model_name, config.api_base_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());

        Ok(Self {
            config,
            api_key,
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn api_key(&self) -> Result<&str, ClientError> {
        self.api_key.as_deref().ok_or(ClientError::NotConfigured)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.config.timeout_seconds)
        } else if e.is_connect() {
            ClientError::Connect(self.config.api_base_url.clone())
        } else {
            ClientError::Transport(e.to_string())
        }
    }

    /// Send a request and turn non-2xx statuses into [`ClientError::Api`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        Ok(response)
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// Fetch the current state of an uploaded file.
    async fn get_file(&self, name: &str) -> Result<FileResource, ClientError> {
        let key = self.api_key()?;
        let request = self
            .http_client
            .get(self.url(&format!("v1beta/{}", name)))
            .header(API_KEY_HEADER, key);

        Self::parse_json(self.send(request).await?).await
    }

    /// Delete an uploaded file by resource name.
    async fn delete_by_name(&self, name: &str) -> Result<(), ClientError> {
        let key = self.api_key()?;
        debug!("Deleting remote file {}", name);

        self.send(
            self.http_client
                .delete(self.url(&format!("v1beta/{}", name)))
                .header(API_KEY_HEADER, key),
        )
        .await?;

        Ok(())
    }

    /// Wait until an uploaded file leaves the `PROCESSING` state.
    async fn wait_until_active(&self, mut file: FileResource) -> Result<FileResource, ClientError> {
        for attempt in 0..self.config.file_poll_attempts {
            match file.state.as_str() {
                "ACTIVE" | "" => return Ok(file),
                "PROCESSING" => {
                    debug!(
                        "File {} still processing (check {})",
                        file.name,
                        attempt + 1
                    );
                    tokio::time::sleep(self.config.file_poll_interval).await;
                    file = self.get_file(&file.name).await?;
                }
                _ => break,
            }
        }

        if file.state == "ACTIVE" {
            return Ok(file);
        }

        Err(ClientError::FileNotReady {
            name: file.name,
            state: file.state,
        })
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ClientError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        warn!("Prompt was blocked by the service: {}", reason);
        return Err(ClientError::EmptyResponse);
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ClientError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = candidate.finish_reason {
            warn!("Model returned no text (finish reason: {})", reason);
        }
        return Err(ClientError::EmptyResponse);
    }

    Ok(text)
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&RemoteFile>,
    ) -> Result<String, ClientError> {
        let key = self.api_key()?;
        let url = self.url(&format!(
            "v1beta/models/{}:generateContent",
            self.config.model_name
        ));

        let mut parts = vec![Part {
            text: Some(prompt.to_string()),
            file_data: None,
        }];
        if let Some(file) = attachment {
            parts.push(Part {
                text: None,
                file_data: Some(FileData {
                    mime_type: file.mime_type.clone(),
                    file_uri: file.uri.clone(),
                }),
            });
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        debug!(
            "Sending generateContent request ({} prompt chars, attachment: {})",
            prompt.len(),
            attachment.is_some()
        );

        let response = self
            .send(
                self.http_client
                    .post(&url)
                    .header(API_KEY_HEADER, key)
                    .json(&request),
            )
            .await?;

        extract_text(Self::parse_json(response).await?)
    }

    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ClientError> {
        let key = self.api_key()?;
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        info!("Uploading {} ({} bytes)", display_name, bytes.len());

        let start = self
            .send(
                self.http_client
                    .post(self.url("upload/v1beta/files"))
                    .header(API_KEY_HEADER, key)
                    .header("X-Goog-Upload-Protocol", "resumable")
                    .header("X-Goog-Upload-Command", "start")
                    .header("X-Goog-Upload-Header-Content-Length", bytes.len())
                    .header("X-Goog-Upload-Header-Content-Type", mime_type)
                    .json(&json!({ "file": { "display_name": display_name } })),
            )
            .await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                ClientError::MalformedResponse("missing upload URL header".to_string())
            })?;

        let finished = self
            .send(
                self.http_client
                    .post(&upload_url)
                    .header("X-Goog-Upload-Offset", 0)
                    .header("X-Goog-Upload-Command", "upload, finalize")
                    .body(bytes),
            )
            .await?;

        let uploaded: UploadResponse = Self::parse_json(finished).await?;
        let name = uploaded.file.name.clone();

        // The caller never sees a file that failed to activate, so remove it here.
        let file = match self.wait_until_active(uploaded.file).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(delete_err) = self.delete_by_name(&name).await {
                    warn!("Failed to delete remote file {}: {}", name, delete_err);
                }
                return Err(e);
            }
        };

        debug!("Uploaded file {} is active", file.name);

        Ok(RemoteFile {
            name: file.name,
            uri: file.uri,
            mime_type: if file.mime_type.is_empty() {
                mime_type.to_string()
            } else {
                file.mime_type
            },
        })
    }

    async fn delete_file(&self, file: &RemoteFile) -> Result<(), ClientError> {
        self.delete_by_name(&file.name).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ClientError> {
        let key = self.api_key()?;
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(self.url("v1beta/models"))
                .header(API_KEY_HEADER, key)
                .query(&[("pageSize", "1000")]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListModelsResponse = Self::parse_json(self.send(request).await?).await?;
            models.extend(page.models);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}
