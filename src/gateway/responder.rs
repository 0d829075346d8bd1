//! One-shot reply channel back to the waiting HTTP request.

use std::sync::Mutex;
use tokio::sync::oneshot;
use wapair_core::pairing::Rejection;

/// What the HTTP handler should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingReply {
    /// Formatted pairing code.
    Code(String),
    Rejected(Rejection),
    /// Another pairing session owns the session directory.
    Busy,
    /// Setup failed before anything was sent.
    Failed,
}

/// Sends at most one [`PairingReply`]; later sends are dropped.
pub struct Responder {
    tx: Mutex<Option<oneshot::Sender<PairingReply>>>,
}

impl Responder {
    pub fn new() -> (Self, oneshot::Receiver<PairingReply>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Send `reply` if nothing was sent yet. Returns whether it was sent.
    pub fn send(&self, reply: PairingReply) -> bool {
        let sender = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        match sender {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}
