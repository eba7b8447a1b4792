//! Git operations via the system `git` binary.

pub mod probe;

pub use probe::{GitCli, RepositoryProbe, check_git_installed};
