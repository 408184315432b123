use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::stream::{fragments, FragmentStream};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generation host not reachable at {0}")]
    ServerNotRunning(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation host error ({status}): {body}")]
    Status { status: u16, body: String },
}

/// Body of `POST /api/generate`. Sampling options are sent top-level.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub temperature: f32,
    #[serde(rename = "num_predict")]
    pub max_tokens: u32,
    #[serde(rename = "stop")]
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists installed model names, failing on any transport error or non-2xx status.
    pub async fn probe(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    LlmError::ServerNotRunning(self.base_url.clone())
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse = response.json().await?;
        let names: Vec<String> = tags.models.into_iter().filter_map(|m| m.name).collect();
        tracing::info!(models = ?names, "available models");

        Ok(names)
    }

    /// Like [`probe`](Self::probe), but an unreachable host yields an empty list.
    pub async fn list_models(&self) -> Vec<String> {
        match self.probe().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not list available models");
                Vec::new()
            }
        }
    }

    /// Sends a streaming generation request and returns the response text fragments.
    ///
    /// Only the initial response is checked here; errors after the headers
    /// arrive surface as items of the returned stream.
    pub async fn generate_stream(&self, request: &GenerateRequest) -> Result<FragmentStream, LlmError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ServerNotRunning(self.base_url.clone())
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(fragments(Box::pin(response.bytes_stream())))
    }
}

/// Picks the model to use: the configured one if installed, else the first
/// installed model, else the configured name unchanged.
pub fn select_model(configured: &str, available: &[String]) -> String {
    if available.iter().any(|m| m == configured) {
        return configured.to_string();
    }
    match available.first() {
        Some(first) => {
            tracing::info!(configured, fallback = %first, "configured model not installed");
            first.clone()
        }
        None => configured.to_string(),
    }
}
