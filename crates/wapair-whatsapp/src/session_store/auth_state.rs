//! [`AuthState`] over a [`FileSessionStore`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use wapair_core::error::PairError;
use wapair_core::traits::{AuthState, ConnectOptions, SessionHandle};

use super::FileSessionStore;
use crate::whatsapp::start_client;

/// Multi-file auth state that can start a WhatsApp client bound to itself.
pub struct FileAuthState {
    store: Arc<FileSessionStore>,
}

impl FileAuthState {
    pub fn new(store: Arc<FileSessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<FileSessionStore> {
        &self.store
    }
}

fn store_err(e: impl std::fmt::Display) -> PairError {
    PairError::Store(e.to_string())
}

#[async_trait]
impl AuthState for FileAuthState {
    async fn is_registered(&self) -> bool {
        self.store.is_registered().await
    }

    async fn save_creds(&self) -> Result<(), PairError> {
        if self.store.flush_creds().await.map_err(store_err)? {
            debug!("credentials saved to {}", self.store.dir().display());
        }
        Ok(())
    }

    async fn export_credentials(&self) -> Result<String, PairError> {
        self.store
            .export_credentials()
            .await
            .map_err(store_err)?
            .ok_or_else(|| PairError::Store("no credentials to export".into()))
    }

    async fn connect(&self, options: ConnectOptions) -> Result<SessionHandle, PairError> {
        start_client(self.store.clone(), options).await
    }
}
