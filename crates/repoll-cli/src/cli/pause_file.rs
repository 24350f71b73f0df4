//! Liveness from a pause file: the host is inactive while the file exists.

use repoll_core::{VisibilityGate, VisibilitySource};
use std::path::PathBuf;
use std::time::Duration;

pub const PAUSE_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Spawn a task that checks `path` every `every` and return a gate on it.
/// The task stops once the gate is dropped.
pub fn watch_pause_file(path: PathBuf, every: Duration) -> VisibilityGate {
    let source = VisibilitySource::new(!path.exists());
    let gate = source.gate();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        while source.has_subscribers() {
            ticker.tick().await;
            let paused = tokio::fs::try_exists(&path).await.unwrap_or(false);
            source.set_active(!paused);
        }
        tracing::debug!(path = %path.display(), "pause file watcher stopped");
    });
    gate
}
