//! WhatsApp backend via `whatsapp-rust`.
//!
//! Uses the WhatsApp Web protocol (Noise handshake + Signal encryption).
//! A device links either by scanning a QR code printed on the terminal or by
//! entering a pairing code requested for a phone number. Session state lives
//! in a multi-file auth directory (see [`crate::session_store`]).

mod bot;
mod events;
pub mod qr;
mod send;
mod session;


pub(crate) use bot::start_client;
pub use session::WhatsAppSession;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wapair_core::config::VersionConfig;
use wapair_core::error::PairError;
use wapair_core::session::ProtocolVersion;
use wapair_core::traits::{AuthState, Connector};

use crate::session_store::{FileAuthState, FileSessionStore};
use crate::version;

/// [`Connector`] that opens file-backed auth state and starts `whatsapp-rust` clients.
pub struct WhatsAppConnector {
    http: reqwest::Client,
    version: VersionConfig,
}

impl WhatsAppConnector {
    pub fn new(version: VersionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            version,
        }
    }
}

#[async_trait]
impl Connector for WhatsAppConnector {
    async fn latest_version(&self) -> ProtocolVersion {
        version::fetch_latest_version(&self.http, &self.version).await
    }

    async fn load_auth_state(&self, dir: &Path) -> Result<Arc<dyn AuthState>, PairError> {
        let store = FileSessionStore::open(dir).await?;
        info!("auth state loaded from {}", dir.display());
        Ok(Arc::new(FileAuthState::new(Arc::new(store))))
    }
}
