//! One-shot completion signal
//!
//! Single writer, any number of readers, set exactly once. The writer side is
//! a move-only [`SignalTrigger`]: firing consumes it, and dropping it without
//! firing fires as well, so a signal can never be left unset by an early
//! return or a panic in its owner.

use tokio::sync::watch;

/// Create a connected trigger/observer pair
pub(crate) fn signal() -> (SignalTrigger, Signal) {
    let (tx, rx) = watch::channel(false);
    (SignalTrigger { tx }, Signal { rx })
}

/// Observer side of a one-shot signal; cheap to clone
#[derive(Debug, Clone)]
pub struct Signal {
    rx: watch::Receiver<bool>,
}

impl Signal {
    /// Non-blocking check
    pub fn is_set(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal is set; returns immediately if it already is
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // The trigger stores `true` before it is dropped, so the channel can
        // only close after the value this waits for is visible.
        let _ = rx.wait_for(|set| *set).await;
    }
}

/// Writer side of a one-shot signal
#[derive(Debug)]
pub(crate) struct SignalTrigger {
    tx: watch::Sender<bool>,
}

impl SignalTrigger {
    /// Set the signal
    pub(crate) fn fire(self) {
        // Drop does the work
    }
}

impl Drop for SignalTrigger {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}
