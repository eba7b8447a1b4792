//! aicommit - A CLI tool that writes git commit messages for the staged diff.
//!
//! # Overview
//!
//! aicommit reads the staged changes, asks a model (the Gemini API, or a local
//! Ollama daemon with `--local`) for several Conventional Commit messages, lets
//! the user pick one and commits with it. With `--review` the model also roasts
//! the diff while the messages are being generated.

pub mod backend;
pub mod cli;
pub mod commit;
pub mod config;
pub mod context;
pub mod error;
pub mod git;

// Re-export commonly used types
pub use backend::{Backend, BackendKind, GeminiBackend, OllamaBackend, select_backend};
pub use commit::{Presenter, RunOptions, RunOutcome, TerminalPresenter, run};
pub use context::{ContextFlags, GenerationContext, GenerationMode, resolve_context};
pub use error::{BackendError, CommitError, ConfigError, GitError, PromptError};
pub use git::{GitCli, RepositoryProbe};
