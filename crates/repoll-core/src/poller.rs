//! Recurring-request orchestrator.
//!
//! Issues a request, waits `interval` after each success, backs off after
//! each failure, and gives up once a failure run exceeds the attempt budget.
//! While the host is inactive nothing is scheduled; reactivation restarts
//! the cycle with an immediate request and a fresh failure ledger.
//!
//! Every phase races its own future (request, interval timer, backoff timer)
//! against the next liveness trigger, so at most one request is ever in
//! flight and a trigger drops whatever the previous cycle was waiting on.

use std::future::{self, Future};
use std::time::Duration;

use async_stream::stream;
use futures::Stream;

use crate::config::{ConfigError, PollConfig};
use crate::retry::{FailureLedger, PollError, RetryDecision, RetryPolicy};
use crate::visibility::VisibilityGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Host inactive: no request, no timer.
    Suspended,
    Requesting,
    /// Last request succeeded; waiting for the interval.
    IntervalWait,
    /// Last request failed; waiting out the backoff delay.
    BackoffWait(Duration),
}

enum Step<T, E> {
    Trigger(bool),
    Completed(Result<T, E>),
    Elapsed,
}

/// Validated poll settings; produces result streams.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    background: bool,
    policy: RetryPolicy,
}

impl Poller {
    /// Validate `config`. Non-fatal diagnostics are logged and polling
    /// proceeds with the fallback behavior.
    pub fn new(config: &PollConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        for diagnostic in config.diagnostics() {
            tracing::warn!("{}", diagnostic);
        }
        Ok(Self {
            interval: config.interval(),
            background: config.background_polling,
            policy: config.retry_policy(),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Poll on a host that is always active.
    pub fn poll<T, E, F, Fut>(&self, request: F) -> impl Stream<Item = Result<T, PollError<E>>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.poll_with_visibility(request, VisibilityGate::always_active())
    }

    /// Poll, suspending while `gate` reports the host inactive (unless
    /// background polling is enabled).
    ///
    /// The stream yields each successful value. It ends with a single
    /// `Err(PollError::Exhausted)` once more than `attempts` failures occur in
    /// a row. Dropping the stream cancels any pending request or timer.
    pub fn poll_with_visibility<T, E, F, Fut>(
        &self,
        mut request: F,
        mut gate: VisibilityGate,
    ) -> impl Stream<Item = Result<T, PollError<E>>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let interval = self.interval;
        let background = self.background;
        let policy = self.policy.clone();

        stream! {
            let mut phase = if background || gate.is_active() {
                Phase::Requesting
            } else {
                tracing::info!("host inactive, polling suspended");
                Phase::Suspended
            };
            let mut ledger = FailureLedger::new();

            loop {
                let step = match phase {
                    Phase::Suspended => Step::Trigger(gate.changed().await),
                    Phase::Requesting => {
                        tracing::debug!(
                            consecutive_failures = ledger.consecutive(),
                            "issuing request"
                        );
                        tokio::select! {
                            biased;
                            active = next_trigger(&mut gate, background) => Step::Trigger(active),
                            outcome = request() => Step::Completed(outcome),
                        }
                    }
                    Phase::IntervalWait => tokio::select! {
                        biased;
                        active = next_trigger(&mut gate, background) => Step::Trigger(active),
                        _ = tokio::time::sleep(interval) => Step::Elapsed,
                    },
                    Phase::BackoffWait(delay) => tokio::select! {
                        biased;
                        active = next_trigger(&mut gate, background) => Step::Trigger(active),
                        _ = tokio::time::sleep(delay) => Step::Elapsed,
                    },
                };

                match step {
                    Step::Trigger(true) => {
                        tracing::info!("host active, restarting poll cycle");
                        ledger = FailureLedger::new();
                        phase = Phase::Requesting;
                    }
                    Step::Trigger(false) => {
                        if phase != Phase::Suspended {
                            tracing::info!("host inactive, polling suspended");
                        }
                        phase = Phase::Suspended;
                    }
                    Step::Elapsed => phase = Phase::Requesting,
                    Step::Completed(Ok(value)) => {
                        ledger.record_success();
                        phase = Phase::IntervalWait;
                        yield Ok(value);
                    }
                    Step::Completed(Err(err)) => {
                        let consecutive = ledger.record_failure();
                        match policy.decide(consecutive) {
                            RetryDecision::RetryAfter(delay) => {
                                tracing::warn!(
                                    consecutive,
                                    total = ledger.total(),
                                    delay_ms = whole_millis(delay),
                                    "request failed, retrying: {}",
                                    err
                                );
                                phase = Phase::BackoffWait(delay);
                            }
                            RetryDecision::NoRetry => {
                                tracing::error!(
                                    consecutive,
                                    attempts = policy.attempts,
                                    "request failed, giving up: {}",
                                    err
                                );
                                yield Err(PollError::Exhausted {
                                    failures: consecutive,
                                    attempts: policy.attempts,
                                    source: err,
                                });
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Next liveness trigger, or never when background polling ignores liveness.
async fn next_trigger(gate: &mut VisibilityGate, background: bool) -> bool {
    if background {
        return future::pending().await;
    }
    gate.changed().await
}

/// Milliseconds for logging, saturating for delays past `u64::MAX` ms.
fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Validate `config` and poll `request` on an always-active host.
pub fn poll<T, E, F, Fut>(
    request: F,
    config: &PollConfig,
) -> Result<impl Stream<Item = Result<T, PollError<E>>>, ConfigError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    Ok(Poller::new(config)?.poll(request))
}
