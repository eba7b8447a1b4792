//! Command-line interface.

use clap::Parser;

use crate::backend::BackendKind;
use crate::commit::{DEFAULT_GENERATE_COUNT, RunOptions};
use crate::context::ContextFlags;

const EXAMPLES: &str = "\
Examples:
  aicommit                    Generate commit messages
  aicommit -r                 Review code and generate commits
  aicommit -l                 Use local AI model
  aicommit -g 6               Generate 6 commit messages
  aicommit --oncall -b        Oncall commit with branch name";

/// Generate a commit message for the staged changes with AI.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "aicommit")]
#[command(about = "AI-powered git commit message generator")]
#[command(version)]
#[command(args_override_self = true)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Skip git pre-commit hooks
    #[arg(short = 'n', long)]
    pub no_verify: bool,

    /// Review code changes with AI
    #[arg(short = 'r', long)]
    pub review: bool,

    /// Use local AI model instead of Gemini
    #[arg(short = 'l', long)]
    pub local: bool,

    /// Mark as oncall commit
    #[arg(long)]
    pub oncall: bool,

    /// Include branch name in commit
    #[arg(short = 'b', long)]
    pub branch: bool,

    /// Generate <N> commit messages
    #[arg(
        short = 'g',
        long,
        value_name = "N",
        num_args = 0..=1,
        default_value_t = DEFAULT_GENERATE_COUNT,
        default_missing_value = "4",
        allow_negative_numbers = true,
        value_parser = parse_generate_count
    )]
    pub generate: usize,
}

/// Lenient count parser: anything that is not a positive integer means the default.
fn parse_generate_count(value: &str) -> Result<usize, String> {
    Ok(value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_GENERATE_COUNT))
}

impl Cli {
    pub fn backend_kind(&self) -> BackendKind {
        BackendKind::from_local_flag(self.local)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            flags: ContextFlags {
                oncall: self.oncall,
                branch: self.branch,
            },
            review: self.review,
            skip_hooks: self.no_verify,
            generate: self.generate,
        }
    }
}
