use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisInput, AnalysisResult};
use crate::analysis_request::build_analysis_request;
use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::{Provider, DEFAULT_MODEL};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong during analysis.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The provider answered without any analyzable text.
    #[error("Empty response from AI engine{}", .0.as_deref().map(|r| format!(": {}", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),
    #[error("Malformed analysis response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("{0}")]
    TransportError(String),
}

impl AnalysisError {
    /// Text shown to the user in the error state.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::EmptyResponse(None) => GENERIC_FAILURE_MESSAGE.to_string(),
            other => {
                let message = other.to_string();
                if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message
                }
            }
        }
    }
}

impl From<ApiConnectionError> for AnalysisError {
    fn from(err: ApiConnectionError) -> Self {
        AnalysisError::TransportError(err.to_string())
    }
}

/// Anything that can turn an input into a full analysis.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError>;
}

/// Parses the provider's response text into a typed result. Missing fields or
/// unknown enum values are malformed, never defaulted.
pub fn parse_analysis_text(text: Option<&str>) -> Result<AnalysisResult, AnalysisError> {
    let text = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(AnalysisError::EmptyResponse(None)),
    };
    let result = serde_json::from_str::<AnalysisResult>(text)?;
    Ok(result)
}

pub struct GeminiAnalyzer {
    client: Client,
    provider: Provider,
    model: String,
}

impl GeminiAnalyzer {
    pub fn new(provider: Provider) -> Self {
        Self {
            client: Client::new(),
            provider,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnalysisProvider for GeminiAnalyzer {
    async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
        let request = build_analysis_request(input, &self.model);
        info!(model = %self.model, kind = ?input.kind, "Requesting ingredient analysis");

        let response = self
            .provider
            .call_generate_content(&self.client, &request)
            .await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                output_tokens = ?usage.candidates_token_count,
                thinking_tokens = ?usage.thoughts_token_count,
                "Provider usage"
            );
        }

        let text = response.text();
        if text.is_none() {
            if let Some(reason) = response.block_reason() {
                return Err(AnalysisError::EmptyResponse(Some(format!(
                    "request blocked ({})",
                    reason
                ))));
            }
            if let Some(reason) = response.abnormal_finish_reason() {
                warn!(finish_reason = reason, "Provider stopped without analysis text");
                return Err(AnalysisError::EmptyResponse(Some(format!(
                    "generation stopped ({})",
                    reason
                ))));
            }
        }
        debug!(raw = ?text, "Raw analysis text");
        parse_analysis_text(text.as_deref())
    }
}
