//! [`MessagingSession`] over a running `whatsapp-rust` client.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use wacore_binary::jid::Jid;
use wapair_core::cache::RetryCounterCache;
use wapair_core::error::PairError;
use wapair_core::session::MessageKey;
use wapair_core::traits::MessagingSession;
use whatsapp_rust::client::Client;

use super::send::{retry_send, text_message};
use crate::session_store::FileSessionStore;

/// A live client plus the background tasks that drive it.
pub struct WhatsAppSession {
    client: Arc<Client>,
    store: Arc<FileSessionStore>,
    retry_cache: Arc<RetryCounterCache>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    sent: AtomicU64,
}

impl WhatsAppSession {
    pub(super) fn new(
        client: Arc<Client>,
        store: Arc<FileSessionStore>,
        retry_cache: Arc<RetryCounterCache>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            client,
            store,
            retry_cache,
            tasks: Mutex::new(tasks),
            sent: AtomicU64::new(0),
        }
    }
}

fn parse_jid(jid: &str) -> Result<Jid, PairError> {
    jid.parse()
        .map_err(|e| PairError::Session(format!("invalid whatsapp JID '{jid}': {e}")))
}

#[async_trait]
impl MessagingSession for WhatsAppSession {
    async fn own_jid(&self) -> Option<String> {
        self.store.own_jid().await
    }

    async fn send_text(
        &self,
        to: &str,
        text: &str,
        quoted: Option<&MessageKey>,
    ) -> Result<MessageKey, PairError> {
        let jid = parse_jid(to)?;
        let seq = self.sent.fetch_add(1, Ordering::Relaxed);
        let retry_key = format!("{to}#{seq}");
        let id = retry_send(
            &self.client,
            &jid,
            text_message(text, quoted),
            &self.retry_cache,
            &retry_key,
        )
        .await?;
        Ok(MessageKey {
            id,
            remote_jid: to.to_string(),
            text: text.to_string(),
        })
    }

    async fn accept_group_invite(&self, code: &str) -> Result<(), PairError> {
        self.client
            .groups()
            .join_with_invite_code(code)
            .await
            .map_err(|e| PairError::Session(format!("group join failed: {e}")))?;
        info!("joined group via invite code");
        Ok(())
    }

    async fn close(&self) {
        // The creds forwarder is aborted below; flush whatever it had not relayed yet.
        if let Err(e) = self.store.flush_creds().await {
            warn!("failed to flush credentials on close: {e}");
        }
        self.client.disconnect().await;
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
    }
}
