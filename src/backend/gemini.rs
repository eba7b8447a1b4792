//! Remote backend over the Gemini REST API.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt::{REVIEW_SYSTEM_PROMPT, system_prompt, user_inputs};
use super::stream::lines;
use super::{Backend, ReviewStream, ensure_success};
use crate::config::RemoteConfig;
use crate::context::GenerationContext;
use crate::error::BackendError;

/// Public Gemini API endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let texts: Vec<&str> = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

/// Gemini API client implementing [`Backend`].
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            model: config.model,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model,
            method
        )
    }

    async fn post(
        &self,
        url: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<reqwest::Response, BackendError> {
        debug!(url = %url, model = %self.model, "Sending Gemini request");
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;
        ensure_success(response).await
    }
}

/// Extract the text of one server-sent event line; non-data lines yield `None`.
fn parse_sse_line(line: &str) -> Result<Option<String>, BackendError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }
    let chunk: GenerateContentResponse = serde_json::from_str(data)
        .map_err(|e| BackendError::InvalidResponse(format!("Bad stream chunk: {e}")))?;
    Ok(chunk.text().filter(|t| !t.is_empty()))
}

#[async_trait]
impl Backend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        diff: &str,
        context: &GenerationContext,
    ) -> Result<Option<String>, BackendError> {
        let inputs = user_inputs(context, diff);
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt(context.mode()),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: inputs.iter().map(|text| Part { text: text.as_ref() }).collect(),
            }],
        };

        let response = self.post(&self.endpoint("generateContent"), &request).await?;
        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(body.text())
    }

    async fn review(&self, diff: &str) -> Result<ReviewStream, BackendError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: REVIEW_SYSTEM_PROMPT,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: diff }],
            }],
        };

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(&url, &request).await?;

        let fragments = lines(response.bytes_stream()).filter_map(|line| async move {
            match line {
                Ok(line) => parse_sse_line(&line).transpose(),
                Err(e) => Some(Err(e)),
            }
        });
        Ok(fragments.boxed())
    }
}
