use std::time::Duration;

use super::backoff::Backoff;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The failure run exceeded the attempt budget; surface the error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Attempt budget plus backoff for a failure run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum consecutive failures tolerated before giving up.
    pub attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Decide what to do after the `consecutive`-th failure in a row (1-based).
    pub fn decide(&self, consecutive: u32) -> RetryDecision {
        if consecutive > self.attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff.delay(consecutive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            backoff: Backoff {
                strategy: BackoffStrategy::Exponential,
                exponential_unit: Duration::from_millis(250),
                random_range: (Duration::from_secs(1), Duration::from_secs(10)),
                constant_time: Duration::from_secs(5),
            },
        }
    }

    #[test]
    fn retries_up_to_attempts_then_stops() {
        let p = policy(3);
        assert_eq!(p.decide(1), RetryDecision::RetryAfter(Duration::from_millis(250)));
        assert_eq!(p.decide(2), RetryDecision::RetryAfter(Duration::from_millis(500)));
        assert_eq!(p.decide(3), RetryDecision::RetryAfter(Duration::from_millis(1000)));
        assert_eq!(p.decide(4), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_attempts_never_retries() {
        assert_eq!(policy(0).decide(1), RetryDecision::NoRetry);
    }
}
