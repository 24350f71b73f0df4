use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::retry::{Backoff, BackoffStrategy, RetryPolicy};

/// Interval written into a freshly created config file.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

fn default_attempts() -> u32 {
    9
}

fn default_exponential_unit_ms() -> u64 {
    1000
}

fn default_random_range_ms() -> (u64, u64) {
    (1000, 10_000)
}

/// Problems found in a [`PollConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("exponential unit must be greater than zero")]
    ZeroExponentialUnit,
    #[error("random range is inverted: min {min} ms > max {max} ms")]
    InvertedRandomRange { min: u64, max: u64 },
    /// Non-fatal: polling falls back to the consecutive strategy.
    #[error("unsupported backoff strategy {0:?}, falling back to consecutive")]
    UnsupportedStrategy(String),
}

/// Configuration for one poller, loaded from `~/.config/repoll/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Wait after a successful request before issuing the next one.
    pub interval_ms: u64,
    /// Maximum consecutive failures tolerated before the stream fails.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default)]
    pub backoff_strategy: BackoffStrategy,
    /// Multiplier for the exponential strategy.
    #[serde(default = "default_exponential_unit_ms")]
    pub exponential_unit_ms: u64,
    /// `[min, max)` bounds for the random strategy.
    #[serde(default = "default_random_range_ms")]
    pub random_range_ms: (u64, u64),
    /// Delay for the consecutive strategy; the interval when unset.
    #[serde(default)]
    pub constant_time_ms: Option<u64>,
    /// Keep polling while the host reports itself inactive.
    #[serde(default)]
    pub background_polling: bool,
}

impl PollConfig {
    /// Config with the given interval and defaults for everything else.
    ///
    /// Durations are stored in whole milliseconds; a sub-millisecond
    /// remainder rounds up so a positive interval never becomes zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: duration_ms(interval),
            attempts: default_attempts(),
            backoff_strategy: BackoffStrategy::default(),
            exponential_unit_ms: default_exponential_unit_ms(),
            random_range_ms: default_random_range_ms(),
            constant_time_ms: None,
            background_polling: false,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn exponential_unit(&self) -> Duration {
        Duration::from_millis(self.exponential_unit_ms)
    }

    pub fn random_range(&self) -> (Duration, Duration) {
        let (min, max) = self.random_range_ms;
        (Duration::from_millis(min), Duration::from_millis(max))
    }

    /// Delay used by the consecutive strategy.
    pub fn constant_time(&self) -> Duration {
        Duration::from_millis(self.constant_time_ms.unwrap_or(self.interval_ms))
    }

    /// Reject values the poller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.exponential_unit_ms == 0 {
            return Err(ConfigError::ZeroExponentialUnit);
        }
        let (min, max) = self.random_range_ms;
        if min > max {
            return Err(ConfigError::InvertedRandomRange { min, max });
        }
        Ok(())
    }

    /// Non-fatal findings; polling continues with a fallback.
    pub fn diagnostics(&self) -> Vec<ConfigError> {
        match &self.backoff_strategy {
            BackoffStrategy::Unsupported(name) => {
                vec![ConfigError::UnsupportedStrategy(name.clone())]
            }
            _ => Vec::new(),
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            strategy: self.backoff_strategy.clone(),
            exponential_unit: self.exponential_unit(),
            random_range: self.random_range(),
            constant_time: self.constant_time(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            backoff: self.backoff(),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("repoll")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PollConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PollConfig::new(Duration::from_millis(DEFAULT_INTERVAL_MS));
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<PollConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: PollConfig = toml::from_str(&data)?;
    Ok(cfg)
}
