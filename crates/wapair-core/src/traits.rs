use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::RetryCounterCache;
use crate::error::PairError;
use crate::session::{BrowserIdentity, MessageKey, ProtocolVersion, SessionEvent};

/// Entry point into a messaging backend.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Latest protocol version, or a fallback when it cannot be fetched.
    async fn latest_version(&self) -> ProtocolVersion;

    /// Load (or initialize) the multi-file auth state kept in `dir`.
    async fn load_auth_state(&self, dir: &Path) -> Result<Arc<dyn AuthState>, PairError>;
}

/// Persisted credentials plus the ability to start a client from them.
#[async_trait]
pub trait AuthState: Send + Sync {
    /// Whether these credentials already belong to a linked device.
    async fn is_registered(&self) -> bool;

    /// Flush staged credential changes to disk.
    async fn save_creds(&self) -> Result<(), PairError>;

    /// Serialize the credential record to shareable text.
    async fn export_credentials(&self) -> Result<String, PairError>;

    /// Build and start a client bound to these credentials.
    async fn connect(&self, options: ConnectOptions) -> Result<SessionHandle, PairError>;
}

/// Client construction options.
#[derive(Clone)]
pub struct ConnectOptions {
    pub version: ProtocolVersion,
    pub browser: BrowserIdentity,
    /// Render QR codes on the terminal.
    pub print_qr: bool,
    /// Request a pairing code for this number once the socket is up.
    pub pairing_phone: Option<String>,
    pub retry_cache: Arc<RetryCounterCache>,
}

/// A running client and the events it emits.
pub struct SessionHandle {
    pub session: Arc<dyn MessagingSession>,
    pub events: mpsc::Receiver<SessionEvent>,
}

/// Operations on a live client.
#[async_trait]
pub trait MessagingSession: Send + Sync {
    /// JID of the linked account, available once the connection is open.
    async fn own_jid(&self) -> Option<String>;

    /// Send a text message, optionally quoting an earlier one.
    async fn send_text(
        &self,
        to: &str,
        text: &str,
        quoted: Option<&MessageKey>,
    ) -> Result<MessageKey, PairError>;

    /// Join a group through its invite code.
    async fn accept_group_invite(&self, code: &str) -> Result<(), PairError>;

    /// Disconnect and stop background tasks. Idempotent.
    async fn close(&self);
}
