//! `repoll check` – validate the config and show what a failure run looks like.

use anyhow::Result;
use repoll_core::{BackoffStrategy, PollConfig};

/// Validate `cfg`, then print settings, diagnostics and the retry schedule.
pub fn run_check(cfg: &PollConfig) -> Result<()> {
    cfg.validate()?;
    println!("interval:           {} ms", cfg.interval_ms);
    println!("attempts:           {}", cfg.attempts);
    println!("backoff strategy:   {}", cfg.backoff_strategy);
    println!(
        "background polling: {}",
        if cfg.background_polling { "on" } else { "off" }
    );
    for diagnostic in cfg.diagnostics() {
        println!("warning: {}", diagnostic);
    }
    for line in schedule_lines(cfg) {
        println!("{}", line);
    }
    Ok(())
}

/// Retry rows printed before the schedule is elided.
const SHOWN_RETRIES: u32 = 12;

/// One line per tolerated failure (the wait before the retry that follows
/// it), elided after `SHOWN_RETRIES` rows.
pub(crate) fn schedule_lines(cfg: &PollConfig) -> Vec<String> {
    let backoff = cfg.backoff();
    let mut lines = vec!["failure  retry after".to_string()];
    for n in 1..=cfg.attempts.min(SHOWN_RETRIES) {
        let delay = match backoff.strategy {
            BackoffStrategy::Random => {
                let (min, max) = cfg.random_range_ms;
                if min >= max {
                    format!("{} ms", min)
                } else {
                    format!("{}..{} ms", min, max)
                }
            }
            _ => format!("{} ms", backoff.delay(n).as_millis()),
        };
        lines.push(format!("{:<8} {}", n, delay));
    }
    if cfg.attempts > SHOWN_RETRIES {
        lines.push(format!("...      up to {}", cfg.attempts));
    }
    lines.push(format!("{:<8} give up", u64::from(cfg.attempts) + 1));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn exponential_schedule_doubles() {
        let mut cfg = PollConfig::new(Duration::from_secs(5));
        cfg.attempts = 3;
        assert_eq!(
            schedule_lines(&cfg),
            vec![
                "failure  retry after",
                "1        1000 ms",
                "2        2000 ms",
                "3        4000 ms",
                "4        give up",
            ]
        );
    }

    #[test]
    fn random_schedule_shows_range() {
        let mut cfg = PollConfig::new(Duration::from_secs(5));
        cfg.attempts = 1;
        cfg.backoff_strategy = BackoffStrategy::Random;
        assert_eq!(schedule_lines(&cfg)[1], "1        1000..10000 ms");
    }

    #[test]
    fn random_schedule_with_empty_range_shows_single_delay() {
        let mut cfg = PollConfig::new(Duration::from_secs(5));
        cfg.attempts = 1;
        cfg.backoff_strategy = BackoffStrategy::Random;
        cfg.random_range_ms = (700, 700);
        assert_eq!(schedule_lines(&cfg)[1], "1        700 ms");
    }

    #[test]
    fn huge_attempt_budget_is_elided() {
        let mut cfg = PollConfig::new(Duration::from_secs(5));
        cfg.attempts = u32::MAX;
        let lines = schedule_lines(&cfg);
        assert_eq!(lines.len(), 1 + SHOWN_RETRIES as usize + 2);
        assert_eq!(lines[12], "12       2048000 ms");
        assert_eq!(lines[13], format!("...      up to {}", u32::MAX));
        assert_eq!(lines[14], "4294967296 give up");
        assert!(run_check(&cfg).is_ok());
    }

    #[test]
    fn check_rejects_invalid_config() {
        let cfg = PollConfig::new(Duration::ZERO);
        assert!(run_check(&cfg).is_err());
    }
}
