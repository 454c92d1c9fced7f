use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::http_client::{build_client, read_json};
use crate::app::ports::LanguageModelPort;
use crate::config::ModelConfig;
use crate::constants::SERVICE_MODEL;
use crate::error::{ExternalServiceError, Result};

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RequestContent<'a> {
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RequestPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

/// Text of the first candidate, all parts concatenated.
pub fn completion_text(resp: GenerateContentResponse) -> std::result::Result<String, ExternalServiceError> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ExternalServiceError::MalformedResponse {
            service: SERVICE_MODEL,
            detail: "no text in the first candidate".to_string(),
        });
    }
    Ok(text)
}

/// Gemini `generateContent` REST client.
pub struct GeminiClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl GeminiClient {
    pub fn new(config: ModelConfig, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LanguageModelPort for GeminiClient {
    #[instrument(skip_all, fields(prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> std::result::Result<String, ExternalServiceError> {
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| ExternalServiceError::from_reqwest(SERVICE_MODEL, e))?;
        let body: GenerateContentResponse = read_json(SERVICE_MODEL, resp).await?;
        let text = completion_text(body)?;
        debug!(answer_chars = text.len(), "Model answered");
        Ok(text)
    }
}
