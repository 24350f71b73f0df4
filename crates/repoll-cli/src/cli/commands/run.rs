//! `repoll run` – poll a command until interrupted, exhausted, or `--count` reached.

use anyhow::Result;
use futures::StreamExt;
use repoll_core::{PollConfig, Poller, VisibilityGate};
use std::io::Write;
use std::path::PathBuf;

use crate::cli::pause_file::{watch_pause_file, PAUSE_CHECK_INTERVAL};
use crate::cli::request::CommandRequest;

pub async fn run_poll(
    cfg: &PollConfig,
    command: &[String],
    pause_file: Option<PathBuf>,
    count: Option<u64>,
) -> Result<()> {
    let poller = Poller::new(cfg)?;
    let request = CommandRequest::new(command)?;
    let gate = match pause_file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "watching pause file");
            watch_pause_file(path, PAUSE_CHECK_INTERVAL)
        }
        None => VisibilityGate::always_active(),
    };

    let stream = poller.poll_with_visibility(|| request.run(), gate);
    futures::pin_mut!(stream);

    let mut successes = 0u64;
    loop {
        let item = tokio::select! {
            item = stream.next() => item,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted after {} successful run(s)", successes);
                break;
            }
        };
        let Some(item) = item else { break };
        let output = item?;
        successes += 1;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        if count.is_some_and(|n| successes >= n) {
            tracing::info!("reached {} successful run(s)", successes);
            break;
        }
    }
    Ok(())
}
