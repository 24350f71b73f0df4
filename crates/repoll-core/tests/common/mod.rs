//! Scripted request used by the poll schedule tests.
//!
//! Each call records the virtual time it started at and resolves according to
//! a pattern string: `f` fails, `s` succeeds, and calls past the end succeed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("boom on call {0}")]
pub struct Boom(pub usize);

pub struct Script {
    pattern: Vec<u8>,
    latency: Duration,
    started: Instant,
    calls: Mutex<Vec<Instant>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl Script {
    pub fn new(pattern: &str) -> Arc<Self> {
        Self::with_latency(pattern, Duration::ZERO)
    }

    pub fn with_latency(pattern: &str, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            pattern: pattern.as_bytes().to_vec(),
            latency,
            started: Instant::now(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    /// Request closure for the poller.
    pub fn request(
        self: &Arc<Self>,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<usize, Boom>> + Send>>
    {
        let script = Arc::clone(self);
        move || {
            let script = Arc::clone(&script);
            Box::pin(async move { script.call().await })
        }
    }

    async fn call(&self) -> Result<usize, Boom> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            calls.len()
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match self.pattern.get(n - 1) {
            Some(b'f') => Err(Boom(n)),
            _ => Ok(n),
        }
    }

    /// Start time of each call in milliseconds since the script was created.
    pub fn offsets_ms(&self) -> Vec<u64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.duration_since(self.started).as_millis() as u64)
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight count on completion or cancellation.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
