//! Integration tests for the git CLI repository probe.
//!
//! Runs the real `git` binary against temporary repositories.

mod common;

use std::path::PathBuf;

use aicommit::error::GitError;
use aicommit::git::{GitCli, RepositoryProbe};
use common::{TestRepo, temp_test_dir};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_check_initialized_inside_repo() {
    let test_repo = TestRepo::new();
    let probe = GitCli::new(test_repo.path());

    assert_ok!(probe.check_initialized().await);
}

#[tokio::test]
async fn test_check_initialized_outside_repo() {
    let dir = temp_test_dir();
    let probe = GitCli::new(dir.path());

    let err = assert_err!(probe.check_initialized().await);
    assert!(matches!(err, GitError::NotInitialized));
    assert_eq!(err.to_string(), "Git is not initialized");
}

#[tokio::test]
async fn test_staged_files_lists_only_staged_paths() {
    let test_repo = TestRepo::new();
    test_repo.commit_file("README.md", "hello\n", "chore: init");
    test_repo.stage_file("src/lib.rs", "pub fn x() {}\n");
    test_repo.stage_file("README.md", "hello world\n");
    test_repo.write_file("untracked.txt", "not staged\n");

    let probe = GitCli::new(test_repo.path());
    let mut files = assert_ok!(probe.staged_files().await);
    files.sort();

    assert_eq!(
        files,
        vec![PathBuf::from("README.md"), PathBuf::from("src/lib.rs")]
    );
}

#[tokio::test]
async fn test_staged_files_empty_stage_is_an_error() {
    let test_repo = TestRepo::new();
    test_repo.commit_file("README.md", "hello\n", "chore: init");
    test_repo.write_file("README.md", "changed but not staged\n");

    let probe = GitCli::new(test_repo.path());
    let err = assert_err!(probe.staged_files().await);
    assert!(matches!(err, GitError::NoStagedChanges));
    assert_eq!(err.to_string(), "No files staged");
}

#[tokio::test]
async fn test_staged_diff_contains_changes() {
    let test_repo = TestRepo::new();
    test_repo.stage_file("src/main.rs", "fn main() {\n    println!(\"hi\");\n}\n");

    let probe = GitCli::new(test_repo.path());
    let diff = assert_ok!(probe.staged_diff().await);

    assert!(diff.contains("diff --git a/src/main.rs b/src/main.rs"));
    assert!(diff.contains("+    println!(\"hi\");"));
}

#[tokio::test]
async fn test_staged_diff_outside_repo_is_no_staged_changes() {
    let dir = temp_test_dir();
    let probe = GitCli::new(dir.path());

    let err = assert_err!(probe.staged_diff().await);
    assert!(matches!(err, GitError::NoStagedChanges));
}

#[tokio::test]
async fn test_current_branch_on_named_branch() {
    let test_repo = TestRepo::new();
    test_repo.switch_branch("auth-fix");
    test_repo.commit_file("a.txt", "a\n", "chore: init");

    let probe = GitCli::new(test_repo.path());
    assert_eq!(probe.current_branch().await.as_deref(), Some("auth-fix"));
}

#[tokio::test]
async fn test_current_branch_detached_head_is_none() {
    let test_repo = TestRepo::new();
    let first = test_repo.commit_file("a.txt", "a\n", "chore: first");
    test_repo.commit_file("a.txt", "b\n", "chore: second");
    test_repo.detach_head(first);

    let probe = GitCli::new(test_repo.path());
    assert!(probe.current_branch().await.is_none());
}

#[tokio::test]
async fn test_current_branch_outside_repo_is_none() {
    let dir = temp_test_dir();
    let probe = GitCli::new(dir.path());

    assert!(probe.current_branch().await.is_none());
}

#[tokio::test]
async fn test_commit_records_message_and_returns_output() {
    let test_repo = TestRepo::new();
    test_repo.stage_file("feature.rs", "pub fn feature() {}\n");

    let probe = GitCli::new(test_repo.path());
    let output = assert_ok!(probe.commit("feat(core): add feature", false).await);

    assert!(output.contains("feat(core): add feature"));
    assert_eq!(
        test_repo.head_message().as_deref(),
        Some("feat(core): add feature")
    );
}

#[tokio::test]
async fn test_commit_with_nothing_staged_is_not_an_error() {
    let test_repo = TestRepo::new();
    test_repo.commit_file("a.txt", "a\n", "chore: init");

    let probe = GitCli::new(test_repo.path());
    let output = assert_ok!(probe.commit("feat: nothing", false).await);

    assert!(!output.is_empty());
    assert_eq!(test_repo.head_message().as_deref(), Some("chore: init"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_commit_skip_hooks_bypasses_pre_commit() {
    let test_repo = TestRepo::new();
    test_repo.install_hook("pre-commit", "#!/bin/sh\necho 'hook says no' >&2\nexit 1\n");
    test_repo.stage_file("a.txt", "a\n");

    let probe = GitCli::new(test_repo.path());

    let rejected = assert_ok!(probe.commit("feat: blocked", false).await);
    assert!(rejected.contains("hook says no"));
    assert!(test_repo.head_message().is_none());

    assert_ok!(probe.commit("feat: allowed", true).await);
    assert_eq!(test_repo.head_message().as_deref(), Some("feat: allowed"));
}
