//! Commit orchestration and the terminal it talks to.

pub mod pipeline;
pub mod presenter;

pub use pipeline::{DEFAULT_GENERATE_COUNT, RunOptions, RunOutcome, RunState, run};
pub use presenter::{Presenter, TerminalPresenter};
