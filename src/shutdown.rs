//! Cooperative cancellation.
//!
//! A [`Shutdown`] is a read-only view of a flag that flips once. The
//! paginator checks it before every fetch and races it against the fetch in
//! flight; it never persists anything itself. That stays with
//! [`crate::harvest::run`], so an interrupt and a normal exit cannot both
//! write the output file.

use tokio::sync::watch;
use tracing::{info, warn};

/// Sending half: flips the flag.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request shutdown. Calling it more than once has no further effect.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half: observed by the paginator.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Create a linked trigger/flag pair.
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// A flag that never fires.
    #[cfg(test)]
    pub fn never() -> Shutdown {
        let (trigger, shutdown) = Self::channel();
        // Dropping the sender keeps the last value (false) forever.
        drop(trigger);
        shutdown
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested. Pends forever if the trigger is
    /// dropped without firing.
    pub async fn triggered(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Spawn a task that triggers shutdown on Ctrl-C and return the flag.
pub fn listen_for_ctrl_c() -> Shutdown {
    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Detected SIGINT; stopping after saving what was collected");
                trigger.trigger();
            }
            Err(e) => warn!(error = %e, "Could not install Ctrl-C handler"),
        }
    });
    shutdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_flips_flag() {
        let (trigger, mut shutdown) = Shutdown::channel();
        assert!(!shutdown.is_triggered());

        trigger.trigger();
        trigger.trigger();
        assert!(shutdown.is_triggered());

        tokio::time::timeout(Duration::from_secs(1), shutdown.triggered())
            .await
            .expect("triggered() should resolve once the flag is set");
    }

    #[tokio::test]
    async fn test_never_does_not_resolve() {
        let mut shutdown = Shutdown::never();
        assert!(!shutdown.is_triggered());
        let waited = tokio::time::timeout(Duration::from_millis(50), shutdown.triggered()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_clones_observe_same_flag() {
        let (trigger, shutdown) = Shutdown::channel();
        let other = shutdown.clone();
        trigger.trigger();
        assert!(shutdown.is_triggered());
        assert!(other.is_triggered());
    }
}
