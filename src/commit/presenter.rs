//! Terminal interaction for the commit pipeline.

use std::io::{self, Write};
use std::path::PathBuf;

use dialoguer::{Confirm, Select};

use crate::error::PromptError;

/// Everything the pipeline shows to or asks of the user.
///
/// This abstraction allows scripting the user in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Presenter: Send + Sync {
    /// A short progress line.
    fn status(&self, message: &str);

    /// List the staged files.
    fn staged_files(&self, files: &[PathBuf]);

    /// Ask "Is oncall?" (default yes). `None` if the user cancelled.
    fn confirm_oncall(&self) -> Result<Option<bool>, PromptError>;

    /// Print one review fragment as soon as it arrives, without adding a newline.
    fn review_fragment(&self, fragment: &str);

    /// Close the review output.
    fn review_finished(&self);

    /// A non-fatal problem the user should know about.
    fn warn(&self, message: &str);

    /// Pick one of several candidates. `None` if the user cancelled.
    fn select_message(&self, candidates: &[String]) -> Result<Option<String>, PromptError>;

    /// Confirm the only candidate (default no). Cancelling counts as declining.
    fn confirm_message(&self, message: &str) -> Result<bool, PromptError>;

    /// Show what `git commit` printed.
    fn commit_output(&self, output: &str);
}

/// [`Presenter`] for an interactive terminal.
///
/// Status lines and warnings go to stderr; review text and git output go to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for TerminalPresenter {
    fn status(&self, message: &str) {
        eprintln!("{message}");
    }

    fn staged_files(&self, files: &[PathBuf]) {
        eprintln!("{} files in stage", files.len());
        for file in files {
            eprintln!("    {}", file.display());
        }
    }

    fn confirm_oncall(&self) -> Result<Option<bool>, PromptError> {
        Ok(Confirm::new()
            .with_prompt("Is oncall?")
            .default(true)
            .interact_opt()?)
    }

    fn review_fragment(&self, fragment: &str) {
        let mut stdout = io::stdout().lock();
        // A closed stdout should not abort the run.
        let _ = stdout.write_all(fragment.as_bytes());
        let _ = stdout.flush();
    }

    fn review_finished(&self) {
        println!("\n");
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {message}");
    }

    fn select_message(&self, candidates: &[String]) -> Result<Option<String>, PromptError> {
        let choice = Select::new()
            .with_prompt("Choose a commit message (Esc or q to exit)")
            .items(candidates)
            .default(0)
            .interact_opt()?;

        Ok(choice.and_then(|index| candidates.get(index).cloned()))
    }

    fn confirm_message(&self, message: &str) -> Result<bool, PromptError> {
        let answer = Confirm::new()
            .with_prompt(format!("Use this commit?\n\n    {message}\n"))
            .default(false)
            .interact_opt()?;

        Ok(answer.unwrap_or(false))
    }

    fn commit_output(&self, output: &str) {
        let output = output.trim_end();
        if !output.is_empty() {
            println!("{output}");
        }
    }
}
