//! aicommit - CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use aicommit::cli::Cli;
use aicommit::git::check_git_installed;
use aicommit::{GitCli, RunOutcome, TerminalPresenter, run, select_backend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Step 1: Check prerequisites
    check_git_installed().context("git is required")?;

    // Step 2: Pick the model backend (the remote one needs the config file)
    let kind = cli.backend_kind();
    let backend = select_backend(kind, None)
        .with_context(|| format!("Could not set up the {} backend", kind))?;

    // Step 3: Generate, review, select and commit
    let probe = GitCli::current_dir();
    let presenter = TerminalPresenter::new();
    let outcome = run(&cli.run_options(), &probe, backend, &presenter).await?;

    match outcome {
        RunOutcome::Committed { message, .. } => debug!("Committed: {}", message),
        RunOutcome::Aborted => debug!("Nothing committed"),
    }

    Ok(())
}
