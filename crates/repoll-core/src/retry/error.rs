//! Terminal poll error.

use std::fmt;

/// Error surfaced by the poll stream once a failure run exhausts the budget.
///
/// Transient failures never reach the consumer; only this terminal error does,
/// carrying the last underlying request error.
#[derive(Debug)]
pub enum PollError<E> {
    /// `failures` consecutive failures exceeded the `attempts` budget.
    Exhausted { failures: u32, attempts: u32, source: E },
}

impl<E> PollError<E> {
    /// The request error that ended the run.
    pub fn last_error(&self) -> &E {
        match self {
            PollError::Exhausted { source, .. } => source,
        }
    }

    pub fn into_last_error(self) -> E {
        match self {
            PollError::Exhausted { source, .. } => source,
        }
    }
}

impl<E: fmt::Display> fmt::Display for PollError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Exhausted {
                failures,
                attempts,
                source,
            } => write!(
                f,
                "request failed {} times in a row (allowed {}): {}",
                failures, attempts, source
            ),
        }
    }
}

impl<E> std::error::Error for PollError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Exhausted { source, .. } => Some(source),
        }
    }
}
