pub mod config;
pub mod logging;
pub mod poller;
pub mod retry;
pub mod visibility;

pub use config::{ConfigError, PollConfig};
pub use poller::{poll, Poller};
pub use retry::{BackoffStrategy, PollError};
pub use visibility::{VisibilityGate, VisibilitySource};
