//! Pairing gateway: admits pairing requests and runs each as a session task.
//!
//! A request is answered through a one-shot [`Responder`]: with a pairing
//! code, a validation rejection, a busy signal, or a setup failure. QR-mode
//! requests get no reply until their session ends.

mod handoff;
mod reconnect;
mod responder;
mod session;


pub use responder::PairingReply;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;
use wapair_core::config::{Config, ReconnectConfig, SessionConfig};
use wapair_core::pairing::PairingRequest;
use wapair_core::traits::Connector;

use crate::shutdown::Shutdown;
use responder::Responder;
use session::PairingSession;

/// Settings shared by every session.
pub struct Settings {
    pub session: SessionConfig,
    pub reconnect: ReconnectConfig,
    pub retry_ttl: Duration,
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            session: cfg.session.clone(),
            reconnect: cfg.reconnect.clone(),
            retry_ttl: cfg.cache.retry_ttl(),
        }
    }
}

/// Entry point for pairing requests. One session runs at a time because all
/// sessions share the same on-disk session directory.
pub struct PairingGateway {
    connector: Arc<dyn Connector>,
    settings: Arc<Settings>,
    shutdown: Shutdown,
    active: Arc<AtomicBool>,
}

/// Frees the session slot when the session task ends, even by panic.
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PairingGateway {
    pub fn new(connector: Arc<dyn Connector>, settings: Settings, shutdown: Shutdown) -> Self {
        Self {
            connector,
            settings: Arc::new(settings),
            shutdown,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start a pairing session for `request` and return where its reply will arrive.
    pub fn begin(&self, request: PairingRequest) -> oneshot::Receiver<PairingReply> {
        let (responder, rx) = Responder::new();

        if self.active.swap(true, Ordering::SeqCst) {
            info!("pairing request refused, a session is already running");
            responder.send(PairingReply::Busy);
            return rx;
        }

        let slot = SlotGuard(self.active.clone());
        let session = PairingSession {
            connector: self.connector.clone(),
            settings: self.settings.clone(),
            shutdown: self.shutdown.clone(),
            request,
            responder,
        };
        tokio::spawn(async move {
            let _slot = slot;
            session.run().await;
        });
        rx
    }
}
