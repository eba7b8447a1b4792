//! Local backend over the Ollama HTTP API.
//!
//! Each generation mode gets its own derived model whose system prompt is baked
//! in at creation time, so chat requests only carry the user inputs.

use std::env;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompt::{REVIEW_SYSTEM_PROMPT, system_prompt, user_inputs};
use super::stream::lines;
use super::{Backend, ReviewStream, ensure_success};
use crate::context::{GenerationContext, GenerationMode};
use crate::error::BackendError;

/// Daemon address when `OLLAMA_HOST` is unset.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Environment variable naming the Ollama daemon.
pub const OLLAMA_HOST_ENV_VAR: &str = "OLLAMA_HOST";

/// Model every derived model is created from.
pub const BASE_MODEL: &str = "deepseek-coder-v2";

/// Derived model used for the streamed review.
pub const REVIEW_MODEL: &str = "codereview";

/// Name of the derived commit model for `mode`.
pub fn model_name(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Regular => "aicommits-regular",
        GenerationMode::Branch => "aicommits-branch",
        GenerationMode::Oncall => "aicommits-oncall",
        GenerationMode::BranchOncall => "aicommits-branch-oncall",
    }
}

/// Sampling options sent with commit generation requests.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub num_predict: u32,
    pub tfs_z: f32,
    pub top_p: f32,
}

impl SamplingOptions {
    /// Short, varied, single-line output.
    pub const COMMIT: SamplingOptions = SamplingOptions {
        temperature: 1.0,
        num_predict: 30,
        tfs_z: 2.0,
        top_p: 0.5,
    };
}

#[derive(Serialize, Debug)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Serialize, Debug)]
struct CreateRequest<'a> {
    model: &'a str,
    from: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<SamplingOptions>,
}

#[derive(Deserialize, Debug, Default)]
struct ProgressChunk {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    completed: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChatChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ChatChunkMessage {
    #[serde(default)]
    content: String,
}

/// Normalize a host value: add a scheme if missing and drop trailing slashes.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Ollama daemon client implementing [`Backend`].
pub struct OllamaBackend {
    client: Client,
    host: String,
}

impl OllamaBackend {
    pub fn new(host: &str) -> Self {
        Self {
            client: Client::new(),
            host: normalize_host(host),
        }
    }

    /// Build a client for the daemon named by `OLLAMA_HOST`, or the default.
    pub fn from_env() -> Self {
        match env::var(OLLAMA_HOST_ENV_VAR) {
            Ok(host) if !host.trim().is_empty() => Self::new(&host),
            _ => Self::new(DEFAULT_OLLAMA_HOST),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, BackendError> {
        let url = self.url(path);
        debug!(url = %url, "Sending Ollama request");
        let response = self.client.post(&url).json(body).send().await?;
        ensure_success(response).await
    }

    /// Pull the base model, reporting download progress in 10% steps.
    async fn pull_base_model(
        &self,
        progress: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<(), BackendError> {
        progress(&format!("Checking base model: {BASE_MODEL}"));
        let response = self
            .post(
                "/api/pull",
                &PullRequest {
                    model: BASE_MODEL,
                    stream: true,
                },
            )
            .await?;

        let mut chunks = lines(response.bytes_stream()).boxed();
        let mut reported: Option<(u64, u64)> = None;
        while let Some(line) = chunks.next().await {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let chunk: ProgressChunk = serde_json::from_str(&line)
                .map_err(|e| BackendError::InvalidResponse(format!("Bad pull progress: {e}")))?;
            if let Some(error) = chunk.error {
                return Err(BackendError::InvalidResponse(error));
            }
            if let (Some(completed), Some(total)) = (chunk.completed, chunk.total)
                && total > 0
            {
                let step = completed.min(total).saturating_mul(10) / total;
                if reported != Some((total, step)) {
                    reported = Some((total, step));
                    progress(&download_line(completed, total));
                }
            } else if let Some(status) = chunk.status {
                debug!("Pull status: {}", status);
            }
        }

        progress("Base model ready");
        Ok(())
    }

    /// Create (or refresh) a derived model with `system` baked in.
    async fn create_model(&self, model: &str, system: &str) -> Result<(), BackendError> {
        debug!("Creating model {} from {}", model, BASE_MODEL);
        let request = CreateRequest {
            model,
            from: BASE_MODEL,
            system,
            stream: false,
        };
        self.post("/api/create", &request)
            .await
            .map_err(|e| BackendError::Provisioning {
                model: model.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

fn download_line(completed: u64, total: u64) -> String {
    format!(
        "Downloading model: {:.1}% ({:.1}MB / {:.1}MB)",
        completed as f64 / total as f64 * 100.0,
        completed as f64 / 1024.0 / 1024.0,
        total as f64 / 1024.0 / 1024.0
    )
}

/// Decode one NDJSON chat chunk into its content fragment.
fn parse_chat_line(line: &str) -> Result<Option<String>, BackendError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let chunk: ChatChunk = serde_json::from_str(line)
        .map_err(|e| BackendError::InvalidResponse(format!("Bad chat chunk: {e}")))?;
    if let Some(error) = chunk.error {
        return Err(BackendError::InvalidResponse(error));
    }
    if chunk.done {
        debug!("Review stream done");
    }
    Ok(chunk
        .message
        .map(|m| m.content)
        .filter(|content| !content.is_empty()))
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn prepare(
        &self,
        context: &GenerationContext,
        review: bool,
        progress: &(dyn for<'s> Fn(&'s str) + Send + Sync),
    ) -> Result<(), BackendError> {
        if let Err(e) = self.pull_base_model(progress).await {
            warn!("Could not pull {}: {}", BASE_MODEL, e);
        }

        if review {
            self.create_model(REVIEW_MODEL, REVIEW_SYSTEM_PROMPT).await?;
        }
        self.create_model(model_name(context.mode()), system_prompt(context.mode()))
            .await
    }

    async fn generate(
        &self,
        diff: &str,
        context: &GenerationContext,
    ) -> Result<Option<String>, BackendError> {
        let inputs = user_inputs(context, diff);
        let request = ChatRequest {
            model: model_name(context.mode()),
            messages: inputs
                .iter()
                .map(|content| ChatMessage {
                    role: "user",
                    content: content.as_ref(),
                })
                .collect(),
            stream: false,
            options: Some(SamplingOptions::COMMIT),
        };

        let response = self.post("/api/chat", &request).await?;
        let chunk: ChatChunk = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        if let Some(error) = chunk.error {
            return Err(BackendError::InvalidResponse(error));
        }

        Ok(chunk.message.map(|m| m.content))
    }

    async fn review(&self, diff: &str) -> Result<ReviewStream, BackendError> {
        let request = ChatRequest {
            model: REVIEW_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: diff,
            }],
            stream: true,
            options: None,
        };

        let response = self.post("/api/chat", &request).await?;
        let fragments = lines(response.bytes_stream()).filter_map(|line| async move {
            match line {
                Ok(line) => parse_chat_line(&line).transpose(),
                Err(e) => Some(Err(e)),
            }
        });
        Ok(fragments.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names_are_distinct_per_mode() {
        let names: Vec<&str> = GenerationMode::ALL.iter().map(|m| model_name(*m)).collect();
        assert_eq!(
            names,
            vec![
                "aicommits-regular",
                "aicommits-branch",
                "aicommits-oncall",
                "aicommits-branch-oncall"
            ]
        );
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("localhost:11434"), "http://localhost:11434");
        assert_eq!(normalize_host("http://gpu-box:11434/"), "http://gpu-box:11434");
        assert_eq!(normalize_host("https://ollama.internal"), "https://ollama.internal");
    }

    #[test]
    fn test_from_env_uses_default_host() {
        temp_env::with_var_unset(OLLAMA_HOST_ENV_VAR, || {
            assert_eq!(OllamaBackend::from_env().host(), DEFAULT_OLLAMA_HOST);
        });
    }

    #[test]
    fn test_from_env_reads_host_variable() {
        temp_env::with_var(OLLAMA_HOST_ENV_VAR, Some("10.0.0.5:11434"), || {
            assert_eq!(OllamaBackend::from_env().host(), "http://10.0.0.5:11434");
        });
    }

    #[test]
    fn test_from_env_ignores_blank_host() {
        temp_env::with_var(OLLAMA_HOST_ENV_VAR, Some("  "), || {
            assert_eq!(OllamaBackend::from_env().host(), DEFAULT_OLLAMA_HOST);
        });
    }

    #[test]
    fn test_chat_request_carries_sampling_options() {
        let request = ChatRequest {
            model: "aicommits-regular",
            messages: vec![ChatMessage {
                role: "user",
                content: "diff",
            }],
            stream: false,
            options: Some(SamplingOptions::COMMIT),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["options"]["num_predict"], 30);
        assert_eq!(json["options"]["top_p"], 0.5);
        assert_eq!(json["options"]["tfs_z"], 2.0);
        assert_eq!(json["options"]["temperature"], 1.0);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_review_request_omits_options() {
        let request = ChatRequest {
            model: REVIEW_MODEL,
            messages: vec![],
            stream: true,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_download_line() {
        assert_eq!(
            download_line(512 * 1024 * 1024, 1024 * 1024 * 1024),
            "Downloading model: 50.0% (512.0MB / 1024.0MB)"
        );
    }

    #[test]
    fn test_parse_chat_line() {
        let line = r#"{"message":{"role":"assistant","content":"Yikes"},"done":false}"#;
        assert_eq!(parse_chat_line(line).unwrap().as_deref(), Some("Yikes"));

        let last = r#"{"message":{"role":"assistant","content":""},"done":true}"#;
        assert!(parse_chat_line(last).unwrap().is_none());

        assert!(parse_chat_line("").unwrap().is_none());
        assert!(parse_chat_line(r#"{"error":"model not found"}"#).is_err());
        assert!(parse_chat_line("garbage").is_err());
    }
}
