//! Process shutdown coordination.
//!
//! Shutdown runs in a fixed order: a component triggers it with an exit code,
//! the HTTP server stops accepting and drains, `main` drops the log writer
//! guard, then the process exits with that code.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Cloneable handle carrying the requested exit code.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<i32>>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. The first exit code wins.
    pub fn trigger(&self, code: i32) {
        let changed = self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(code);
                true
            } else {
                false
            }
        });
        if changed {
            info!("shutdown requested (exit code {code})");
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been triggered, yielding the exit code.
    pub async fn wait(&self) -> i32 {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(code) = *rx.borrow_and_update() {
                return code;
            }
            if rx.changed().await.is_err() {
                return 0;
            }
        }
    }

    /// Trigger with code 0 on Ctrl-C.
    pub fn listen_for_ctrl_c(&self) {
        let handle = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received");
                handle.trigger(0);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_with_first_code() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();
        let task = tokio::spawn(async move { waiter.wait().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.trigger(3);
        shutdown.trigger(0);
        assert_eq!(task.await.unwrap(), 3);
        assert_eq!(shutdown.exit_code(), Some(3));
    }

    #[tokio::test]
    async fn test_wait_after_trigger_returns_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger(0);
        let code = tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_untriggered_has_no_code() {
        assert_eq!(Shutdown::new().exit_code(), None);
    }
}
