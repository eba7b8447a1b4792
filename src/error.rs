//! Error types for aicommit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the repository probe.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git is not initialized")]
    NotInitialized,

    #[error("No files staged")]
    NoStagedChanges,

    #[error("git not found. Install git and make sure it is on your PATH")]
    GitNotInstalled,

    #[error("Failed to spawn git process: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

/// Errors from loading the per-user config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {path} doesn't exist. Create it with your GEMINI_API_KEY")]
    NotFound { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid JSON: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Add your GEMINI_API_KEY to {path}")]
    MissingCredential { path: PathBuf },

    #[error("Could not determine the home directory for the config file")]
    NoHomeDir,
}

/// Errors from model backends (generation, review, provisioning).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Model request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Failed to provision local model '{model}': {reason}")]
    Provisioning { model: String, reason: String },

    #[error("Message generation task failed: {0}")]
    TaskFailed(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Request(err)
    }
}

/// Errors from interactive prompts.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to read interactive input: {0}")]
    Interaction(#[source] dialoguer::Error),
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        PromptError::Interaction(err)
    }
}

/// Errors from the commit pipeline.
///
/// User cancellation is not an error; it is reported as
/// [`RunOutcome::Aborted`](crate::commit::RunOutcome::Aborted).
#[derive(Error, Debug)]
pub enum CommitError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("The model returned no commit messages. Nothing to commit")]
    NoCandidates,
}
