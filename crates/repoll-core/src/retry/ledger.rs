//! Failure bookkeeping for one poll cycle.

/// Counts failures across a cycle and remembers where the last success was.
///
/// `consecutive = total - recovered_at`, so a success followed by a new
/// failure starts the run over at 1 while `total` keeps growing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureLedger {
    total: u32,
    recovered_at: u32,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a failure and return the number of failures since the last success.
    pub fn record_failure(&mut self) -> u32 {
        self.total = self.total.saturating_add(1);
        self.consecutive()
    }

    /// Mark the current failure count as recovered.
    pub fn record_success(&mut self) {
        self.recovered_at = self.total;
    }

    pub fn consecutive(&self) -> u32 {
        self.total - self.recovered_at
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}
