//! The commit pipeline: probe, resolve context, generate, review, select, commit.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use super::presenter::Presenter;
use crate::backend::Backend;
use crate::context::{ContextFlags, GenerationContext, resolve_context};
use crate::error::{BackendError, CommitError};
use crate::git::RepositoryProbe;

/// Number of candidates requested when `-g` is absent or invalid.
pub const DEFAULT_GENERATE_COUNT: usize = 4;

/// Per-run options taken from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub flags: ContextFlags,
    pub review: bool,
    pub skip_hooks: bool,
    pub generate: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            flags: ContextFlags::default(),
            review: false,
            skip_hooks: false,
            generate: DEFAULT_GENERATE_COUNT,
        }
    }
}

/// Pipeline stage, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Probing,
    ContextResolved,
    Generating,
    AwaitingSelection,
    Committing,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "init",
            RunState::Probing => "probing",
            RunState::ContextResolved => "context-resolved",
            RunState::Generating => "generating",
            RunState::AwaitingSelection => "awaiting-selection",
            RunState::Committing => "committing",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a run ended when nothing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A commit was made with `message`; `output` is what git printed.
    Committed { message: String, output: String },
    /// The user cancelled or declined; nothing was committed.
    Aborted,
}

struct Transitions {
    state: RunState,
}

impl Transitions {
    fn new() -> Self {
        Self {
            state: RunState::Init,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn abort(&self) -> RunOutcome {
        debug!("Run aborted by user in state {}", self.state);
        RunOutcome::Aborted
    }
}

/// Run the whole pipeline once.
///
/// Generation runs as a spawned task while the review (if requested) streams
/// on the foreground; the task is joined only after the review is drained.
pub async fn run(
    options: &RunOptions,
    probe: &dyn RepositoryProbe,
    backend: Arc<dyn Backend>,
    presenter: &dyn Presenter,
) -> Result<RunOutcome, CommitError> {
    let mut progress = Transitions::new();

    probe.check_initialized().await?;
    progress.advance(RunState::Probing);
    presenter.status("Spying your files");

    let diff: Arc<str> = probe.staged_diff().await?.into();
    let files = probe.staged_files().await?;
    presenter.staged_files(&files);

    let oncall_confirmed = if options.flags.oncall {
        match presenter.confirm_oncall()? {
            Some(answer) => answer,
            None => return Ok(progress.abort()),
        }
    } else {
        false
    };

    let branch_name = if options.flags.branch {
        let branch = probe.current_branch().await;
        if branch.is_none() {
            presenter.warn("Could not determine the current branch, the scope will be inferred");
        }
        branch
    } else {
        None
    };

    let context = resolve_context(options.flags, oncall_confirmed, branch_name);
    progress.advance(RunState::ContextResolved);
    debug!(
        backend = backend.name(),
        mode = %context.mode(),
        branch = ?context.branch_name(),
        "Resolved generation context"
    );

    backend
        .prepare(&context, options.review, &|line: &str| presenter.status(line))
        .await?;

    progress.advance(RunState::Generating);
    let messages = spawn_messages(
        Arc::clone(&backend),
        Arc::clone(&diff),
        context,
        options.generate,
    );

    if options.review {
        stream_review(backend.as_ref(), &diff, presenter).await;
    }

    presenter.status("Braining your commit");
    let candidates = messages
        .await
        .map_err(|e| BackendError::TaskFailed(e.to_string()))??;
    progress.advance(RunState::AwaitingSelection);

    let message = match candidates.as_slice() {
        [] => return Err(CommitError::NoCandidates),
        [only] => {
            presenter.status("Are you seriously committing this?");
            if !presenter.confirm_message(only)? {
                return Ok(progress.abort());
            }
            only.clone()
        }
        many => {
            presenter.status("Are you seriously committing this?");
            match presenter.select_message(many)? {
                Some(message) => message,
                None => return Ok(progress.abort()),
            }
        }
    };

    progress.advance(RunState::Committing);
    let output = probe.commit(&message, options.skip_hooks).await?;
    presenter.commit_output(&output);
    progress.advance(RunState::Done);

    Ok(RunOutcome::Committed { message, output })
}

fn spawn_messages(
    backend: Arc<dyn Backend>,
    diff: Arc<str>,
    context: GenerationContext,
    count: usize,
) -> tokio::task::JoinHandle<Result<Vec<String>, BackendError>> {
    tokio::spawn(async move { backend.messages(&diff, &context, count).await })
}

/// Print the review as it streams. Failures end the review, never the run.
async fn stream_review(backend: &dyn Backend, diff: &str, presenter: &dyn Presenter) {
    presenter.status("Grab some coffee while I'm reading your code");

    let mut fragments = match backend.review(diff).await {
        Ok(fragments) => fragments,
        Err(e) => {
            debug!("Review request failed: {:?}", e);
            presenter.warn(&format!("Review unavailable: {e}"));
            return;
        }
    };

    let mut writing = false;
    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                if !writing {
                    presenter.status("Best code I've ever seen");
                    writing = true;
                }
                presenter.review_fragment(&text);
            }
            Err(e) => {
                debug!("Review stream failed: {:?}", e);
                presenter.warn(&format!("Review interrupted: {e}"));
                break;
            }
        }
    }

    presenter.review_finished();
}
