//! Backoff delay computation for consecutive request failures.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Policy used to compute the wait before retrying a failed request.
///
/// Unknown names are kept as `Unsupported` rather than rejected so that a
/// typo in the config file degrades to the `consecutive` delay instead of
/// stopping the poller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BackoffStrategy {
    /// `2^(n-1) * exponential_unit` for the n-th consecutive failure.
    #[default]
    Exponential,
    /// Uniform draw from `random_range`, independent of the failure count.
    Random,
    /// Fixed `constant_time`, or the poll interval when unset.
    Consecutive,
    /// Any other name; behaves like `Consecutive`.
    Unsupported(String),
}

impl BackoffStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            BackoffStrategy::Exponential => "exponential",
            BackoffStrategy::Random => "random",
            BackoffStrategy::Consecutive => "consecutive",
            BackoffStrategy::Unsupported(name) => name,
        }
    }
}

impl From<String> for BackoffStrategy {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "exponential" => BackoffStrategy::Exponential,
            "random" => BackoffStrategy::Random,
            "consecutive" => BackoffStrategy::Consecutive,
            _ => BackoffStrategy::Unsupported(name),
        }
    }
}

impl From<BackoffStrategy> for String {
    fn from(strategy: BackoffStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

impl FromStr for BackoffStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BackoffStrategy::from(s.to_string()))
    }
}

impl fmt::Display for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy plus the parameters each strategy reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    pub strategy: BackoffStrategy,
    pub exponential_unit: Duration,
    /// Half-open `[min, max)` bounds for `Random`.
    pub random_range: (Duration, Duration),
    /// Delay for `Consecutive` (already resolved against the poll interval).
    pub constant_time: Duration,
}

impl Backoff {
    /// Delay before the retry that follows the `consecutive`-th failure in a row.
    ///
    /// `consecutive` is 1-based; 0 is treated as 1.
    pub fn delay(&self, consecutive: u32) -> Duration {
        match &self.strategy {
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(consecutive.saturating_sub(1));
                self.exponential_unit.saturating_mul(factor)
            }
            BackoffStrategy::Random => {
                let (min, max) = self.random_range;
                if min >= max {
                    return min;
                }
                let millis = rand::thread_rng().gen_range(min.as_millis()..max.as_millis());
                Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
            }
            BackoffStrategy::Consecutive => self.constant_time,
            BackoffStrategy::Unsupported(name) => {
                tracing::debug!(strategy = %name, "unsupported backoff strategy, using consecutive delay");
                self.constant_time
            }
        }
    }
}
