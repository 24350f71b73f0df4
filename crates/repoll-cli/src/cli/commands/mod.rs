//! CLI command handlers, one per file.

mod check;
mod completions;
mod run;

pub use check::run_check;
pub use completions::{run_completions, run_man};
pub use run::run_poll;
