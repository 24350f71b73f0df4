//! Host liveness signal.
//!
//! A [`VisibilitySource`] is owned by whatever knows whether the host is
//! active (a hidden window, a pause file, a maintenance flag). Each poller
//! holds a [`VisibilityGate`] subscribed to it: the gate answers the current
//! state synchronously and then yields one trigger per transition.

use std::future;
use tokio::sync::watch;

/// Publishing side of a liveness signal.
#[derive(Debug)]
pub struct VisibilitySource {
    tx: watch::Sender<bool>,
}

impl VisibilitySource {
    pub fn new(active: bool) -> Self {
        let (tx, _rx) = watch::channel(active);
        Self { tx }
    }

    /// Publish the host state. Subscribers are only woken on a real transition.
    pub fn set_active(&self, active: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == active {
                return false;
            }
            *current = active;
            true
        });
        if changed {
            tracing::debug!(active, "visibility changed");
        }
    }

    pub fn is_active(&self) -> bool {
        *self.tx.borrow()
    }

    /// Whether any gate is still subscribed.
    pub fn has_subscribers(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    /// Subscribe a new gate.
    pub fn gate(&self) -> VisibilityGate {
        VisibilityGate::from_receiver(self.tx.subscribe())
    }
}

/// Subscriber side of a liveness signal, consumed by the poller.
#[derive(Debug)]
pub struct VisibilityGate {
    rx: Option<watch::Receiver<bool>>,
    last: bool,
}

impl VisibilityGate {
    /// Gate for hosts with no notion of visibility: always active, never triggers.
    pub fn always_active() -> Self {
        Self {
            rx: None,
            last: true,
        }
    }

    pub fn from_receiver(rx: watch::Receiver<bool>) -> Self {
        let last = *rx.borrow();
        Self { rx: Some(rx), last }
    }

    /// Current state; marks it as seen so `changed` waits for the next transition.
    pub fn is_active(&mut self) -> bool {
        if let Some(rx) = self.rx.as_mut() {
            self.last = *rx.borrow_and_update();
        }
        self.last
    }

    /// Wait for the next transition and return the new state.
    ///
    /// Never resolves for an always-active gate, or once the source is dropped;
    /// the last observed state then holds for good.
    pub async fn changed(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return future::pending().await;
        };
        if rx.changed().await.is_ok() {
            self.last = *rx.borrow_and_update();
            return self.last;
        }
        tracing::debug!(active = self.last, "visibility source dropped");
        self.rx = None;
        future::pending().await
    }
}
