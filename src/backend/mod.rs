//! Model backends: commit message generation and streamed review.
//!
//! Two interchangeable implementations share one contract: the remote
//! [`GeminiBackend`] and the local [`OllamaBackend`]. The implementation is
//! picked once at startup from `--local` and used as `Arc<dyn Backend>`.

pub mod gemini;
pub mod ollama;
pub mod prompt;
pub mod stream;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use futures::stream::BoxStream;
use regex_lite::Regex;
use tracing::debug;

use crate::config::{config_path, load_remote_config};
use crate::context::GenerationContext;
use crate::error::{BackendError, ConfigError};

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

/// Lazy, finite, non-restartable sequence of review fragments.
///
/// Fragments must be printed in yield order; dropping the stream stops the review.
pub type ReviewStream = BoxStream<'static, Result<String, BackendError>>;

/// A model backend capable of generating commit messages and streaming a review.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// One-time setup that must finish before `messages`/`review` are called.
    ///
    /// Long-running steps report short user-facing lines through `progress`.
    async fn prepare(
        &self,
        _context: &GenerationContext,
        _review: bool,
        _progress: &(dyn for<'s> Fn(&'s str) + Send + Sync),
    ) -> Result<(), BackendError> {
        Ok(())
    }

    /// A single generation call. `None` means the model returned no text.
    async fn generate(
        &self,
        diff: &str,
        context: &GenerationContext,
    ) -> Result<Option<String>, BackendError>;

    /// Generate up to `count` distinct candidate messages.
    ///
    /// Calls are made one after another; the first failure aborts the batch.
    async fn messages(
        &self,
        diff: &str,
        context: &GenerationContext,
        count: usize,
    ) -> Result<Vec<String>, BackendError> {
        // `count` is unbounded; grow only as responses arrive.
        let mut raw = Vec::new();
        for attempt in 1..=count {
            debug!(
                backend = self.name(),
                mode = %context.mode(),
                "Generating commit message {}/{}",
                attempt,
                count
            );
            if let Some(text) = self.generate(diff, context).await? {
                raw.push(text);
            }
        }

        let candidates = dedup_candidates(raw);
        debug!(
            backend = self.name(),
            "{} distinct candidates from {} calls",
            candidates.len(),
            count
        );
        Ok(candidates)
    }

    /// Open a streamed review of `diff`.
    async fn review(&self, diff: &str) -> Result<ReviewStream, BackendError>;
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:[A-Za-z0-9_-]*\r?\n)?\s*(.*?)\s*```$").expect("Invalid regex")
});

/// Clean one raw model response into a commit message candidate.
///
/// Trims whitespace and unwraps a surrounding code fence. Quotes are kept as
/// written, so distinct responses stay distinct. Returns `None` if nothing is left.
pub fn normalize_candidate(raw: &str) -> Option<String> {
    let mut text = raw.trim();

    if let Some(caps) = CODE_FENCE.captures(text)
        && let Some(inner) = caps.get(1)
    {
        text = inner.as_str().trim();
    }

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Normalize and deduplicate raw responses, keeping first-occurrence order.
pub fn dedup_candidates<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|text| normalize_candidate(&text))
        .filter(|text| seen.insert(text.clone()))
        .collect()
}

/// Turn a non-2xx response into [`BackendError::Status`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body: body.chars().take(500).collect(),
    })
}

/// Which backend implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl BackendKind {
    pub fn from_local_flag(local: bool) -> Self {
        if local {
            BackendKind::Local
        } else {
            BackendKind::Remote
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "Gemini",
            BackendKind::Local => "Ollama",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the backend for `kind`.
///
/// Only the remote backend reads the config file (`config_file`, or the
/// default location when `None`); a missing file or credential is fatal for it alone.
pub fn select_backend(
    kind: BackendKind,
    config_file: Option<&Path>,
) -> Result<Arc<dyn Backend>, ConfigError> {
    match kind {
        BackendKind::Remote => {
            let path = match config_file {
                Some(path) => path.to_path_buf(),
                None => config_path()?,
            };
            let config = load_remote_config(&path)?;
            Ok(Arc::new(GeminiBackend::new(config)))
        }
        BackendKind::Local => Ok(Arc::new(OllamaBackend::from_env())),
    }
}
