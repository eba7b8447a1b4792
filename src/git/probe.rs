//! Repository probe: the handful of git subprocess calls the commit pipeline needs.
//!
//! Every operation shells out to the system `git` binary so the user's hooks,
//! config and credential helpers apply exactly as they would on the command line.

use std::path::PathBuf;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// Git operations used by the commit pipeline.
///
/// This abstraction allows mocking the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryProbe: Send + Sync {
    /// Fails with `NotInitialized` unless the working directory is inside a work tree.
    async fn check_initialized(&self) -> Result<(), GitError>;

    /// The staged diff. Any git failure is reported as `NoStagedChanges`.
    async fn staged_diff(&self) -> Result<String, GitError>;

    /// Staged file paths. An empty stage is an error, not an empty list.
    async fn staged_files(&self) -> Result<Vec<PathBuf>, GitError>;

    /// Best-effort current branch; `None` on detached HEAD or failure.
    async fn current_branch(&self) -> Option<String>;

    /// Commit the index with `message`, returning git's output for display.
    ///
    /// Success is not inspected; only a failure to start git is an error.
    async fn commit(&self, message: &str, skip_hooks: bool) -> Result<String, GitError>;
}

/// Check that a `git` executable is on `PATH`.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| GitError::GitNotInstalled)
}

/// [`RepositoryProbe`] backed by the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Probe the repository containing `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Probe the repository containing the process's current directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    async fn run_git(&self, args: &[&str]) -> std::io::Result<Output> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
    }

    /// Run git and return stdout, or `None` if it could not run or exited non-zero.
    async fn git_stdout(&self, args: &[&str]) -> Option<String> {
        match self.run_git(args).await {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                debug!(
                    "git {} exited with {:?}: {}",
                    args.join(" "),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                None
            }
            Err(e) => {
                debug!("Failed to run git {}: {}", args.join(" "), e);
                None
            }
        }
    }
}

#[async_trait]
impl RepositoryProbe for GitCli {
    async fn check_initialized(&self) -> Result<(), GitError> {
        match self.git_stdout(&["rev-parse", "--is-inside-work-tree"]).await {
            Some(out) if out.trim() == "true" => Ok(()),
            _ => Err(GitError::NotInitialized),
        }
    }

    async fn staged_diff(&self) -> Result<String, GitError> {
        self.git_stdout(&["diff", "--cached", "--diff-algorithm=minimal"])
            .await
            .ok_or(GitError::NoStagedChanges)
    }

    async fn staged_files(&self) -> Result<Vec<PathBuf>, GitError> {
        let out = self
            .git_stdout(&["diff", "--cached", "--diff-algorithm=minimal", "--name-only"])
            .await
            .ok_or(GitError::NoStagedChanges)?;

        let files = parse_name_only(&out);
        if files.is_empty() {
            return Err(GitError::NoStagedChanges);
        }
        Ok(files)
    }

    async fn current_branch(&self) -> Option<String> {
        let out = self.git_stdout(&["branch", "--show-current"]).await?;
        let branch = out.trim();
        if branch.is_empty() {
            None
        } else {
            Some(branch.to_string())
        }
    }

    async fn commit(&self, message: &str, skip_hooks: bool) -> Result<String, GitError> {
        let mut args = vec!["commit", "-m", message];
        if skip_hooks {
            args.push("--no-verify");
        }

        let output = self.run_git(&args).await.map_err(GitError::SpawnFailed)?;
        if !output.status.success() {
            debug!("git commit exited with {:?}", output.status.code());
        }

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }
        Ok(text)
    }
}

/// Split `git diff --name-only` output into paths, skipping blank lines.
fn parse_name_only(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}
