//! Retry and backoff policy.
//!
//! Backoff strategies, the per-cycle failure ledger, and the attempt budget
//! that decides between another retry and a terminal failure.

mod backoff;
mod error;
mod ledger;
mod policy;

pub use backoff::{Backoff, BackoffStrategy};
pub use error::PollError;
pub use ledger::FailureLedger;
pub use policy::{RetryDecision, RetryPolicy};
