use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::{GenerateContentRequest, GenerateContentResponse, Provider};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl Provider {
    /// Gemini provider against `base_url`. An empty key is allowed: the
    /// provider rejects the call, not this constructor.
    pub fn gemini(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let api_key = api_key.into();
        if api_key.is_empty() {
            warn!("No API key configured; the provider will reject requests");
        }
        Self::Gemini {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint_for(&self, model: &str) -> String {
        match self {
            Provider::Gemini { base_url, .. } => {
                format!("{}/models/{}:generateContent", base_url, model)
            }
        }
    }

    pub async fn call_generate_content(
        &self,
        client: &Client,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        match self {
            Provider::Gemini { api_key, .. } => {
                let url = self.endpoint_for(&request.model);
                let body = serde_json::to_vec(request)?;
                debug!(url = %url, body_bytes = body.len(), "Sending generateContent request");

                let response = client
                    .post(&url)
                    .header("x-goog-api-key", api_key.as_str())
                    .header("Content-Type", "application/json")
                    .body(body)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let text = response.text().await?;
                    let parsed = serde_json::from_str::<GenerateContentResponse>(&text)?;
                    Ok(parsed)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}
