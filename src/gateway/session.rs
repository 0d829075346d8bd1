//! One pairing session: setup, event loop, reconnects, hand-off.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wapair_core::cache::RetryCounterCache;
use wapair_core::error::PairError;
use wapair_core::pairing::{format_pairing_code, PairingRequest};
use wapair_core::session::{ConnectionState, ConnectionUpdate, SessionEvent};
use wapair_core::traits::{
    AuthState, ConnectOptions, Connector, MessagingSession, SessionHandle,
};

use super::handoff::{deliver_credentials, remove_session_dir};
use super::reconnect::ReconnectPolicy;
use super::responder::{PairingReply, Responder};
use super::Settings;
use crate::guard;
use crate::shutdown::Shutdown;

/// A client built by setup, with the auth state it is bound to.
struct Live {
    handle: SessionHandle,
    auth: Arc<dyn AuthState>,
}

/// How a client's event loop ended.
#[derive(Debug)]
enum Drive {
    HandedOff,
    HandoffFailed,
    LoggedOut,
    Closed(Option<u16>),
}

pub(super) struct PairingSession {
    pub(super) connector: Arc<dyn Connector>,
    pub(super) settings: Arc<Settings>,
    pub(super) shutdown: Shutdown,
    pub(super) request: PairingRequest,
    pub(super) responder: Responder,
}

impl PairingSession {
    fn session_dir(&self) -> PathBuf {
        self.settings.session.session_dir()
    }

    /// Run setup and the event loop until the session hands off, is logged
    /// out, fails, or is rejected. Every non-401 close re-runs setup once.
    pub(super) async fn run(self) {
        let retry_cache = Arc::new(RetryCounterCache::new(self.settings.retry_ttl));
        let reconnect = ReconnectPolicy::new(self.settings.reconnect.clone());

        loop {
            let live = match self.setup(&retry_cache).await {
                Ok(Some(live)) => live,
                Ok(None) => return,
                Err(e) => {
                    guard::report("session setup failed", &e);
                    self.responder.send(PairingReply::Failed);
                    return;
                }
            };

            match self.drive(live).await {
                Drive::HandedOff | Drive::HandoffFailed | Drive::LoggedOut => return,
                Drive::Closed(status) => match reconnect.next_delay() {
                    Some((attempt, delay)) => {
                        info!(
                            "connection closed (status {status:?}), reconnecting (attempt {attempt}) in {}ms",
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!("connection closed (status {status:?}), reconnect budget spent");
                        self.responder.send(PairingReply::Failed);
                        return;
                    }
                },
            }
        }
    }

    /// Fetch the version, load auth state, validate, and build a client.
    ///
    /// Returns `Ok(None)` when the request was rejected.
    async fn setup(
        &self,
        retry_cache: &Arc<RetryCounterCache>,
    ) -> Result<Option<Live>, PairError> {
        let version = self.connector.latest_version().await;
        let auth = self
            .connector
            .load_auth_state(&self.session_dir())
            .await?;

        let pairing_phone = if self.request.is_pairing_code() && !auth.is_registered().await {
            match self.request.validate() {
                Ok(phone) => Some(phone),
                Err(rejection) => {
                    info!("pairing request rejected: {rejection}");
                    self.responder.send(PairingReply::Rejected(rejection));
                    return Ok(None);
                }
            }
        } else {
            None
        };

        let options = ConnectOptions {
            version,
            browser: self.settings.session.browser.clone(),
            print_qr: !self.request.is_pairing_code(),
            pairing_phone,
            retry_cache: retry_cache.clone(),
        };
        let handle = auth.connect(options).await?;
        Ok(Some(Live { handle, auth }))
    }

    async fn drive(&self, live: Live) -> Drive {
        let Live {
            handle: SessionHandle {
                session,
                mut events,
            },
            auth,
        } = live;

        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::PairingCode(raw) => {
                    let code = format_pairing_code(&raw);
                    if self.responder.send(PairingReply::Code(code)) {
                        info!("pairing code sent to requester");
                    } else {
                        debug!("pairing code ignored, response already sent");
                    }
                }
                SessionEvent::Qr(_) => debug!("QR code refreshed"),
                SessionEvent::CredsUpdate => save_creds(&*auth).await,
                SessionEvent::Connection(update) => {
                    if update.connection == ConnectionState::Close {
                        save_queued_creds(&mut events, &*auth).await;
                    }
                    if let Some(outcome) = self.on_connection(update, &*session, &*auth).await {
                        return outcome;
                    }
                }
            }
        }

        debug!("event stream ended without a close event");
        session.close().await;
        Drive::Closed(Some(408))
    }

    async fn on_connection(
        &self,
        update: ConnectionUpdate,
        session: &dyn MessagingSession,
        auth: &dyn AuthState,
    ) -> Option<Drive> {
        match update.connection {
            ConnectionState::Connecting => {
                debug!("connecting");
                None
            }
            ConnectionState::Open => Some(self.hand_off(session, auth).await),
            ConnectionState::Close => {
                session.close().await;
                if update.is_logged_out() {
                    warn!("device logged out (401), not reconnecting");
                    if self.settings.session.clear_on_logout {
                        if let Err(e) = remove_session_dir(&self.session_dir()).await {
                            guard::report("failed to clear stale session", &e);
                        }
                    }
                    Some(Drive::LoggedOut)
                } else {
                    if let Some(d) = &update.last_disconnect {
                        guard::report("connection closed", &d.message);
                    }
                    Some(Drive::Closed(update.status_code()))
                }
            }
        }
    }

    async fn hand_off(&self, session: &dyn MessagingSession, auth: &dyn AuthState) -> Drive {
        info!("connected, delivering credentials");
        let delivered = deliver_credentials(session, auth, &self.settings.session).await;
        session.close().await;

        match delivered {
            Ok(()) => {
                if let Err(e) = remove_session_dir(&self.session_dir()).await {
                    guard::report("failed to remove session directory", &e);
                }
                self.shutdown.trigger(0);
                Drive::HandedOff
            }
            Err(e) => {
                guard::report("credential hand-off failed", &e);
                Drive::HandoffFailed
            }
        }
    }
}

async fn save_creds(auth: &dyn AuthState) {
    if let Err(e) = auth.save_creds().await {
        guard::report("failed to save credentials", &e);
    }
}

/// Persist credential updates still queued behind a close. Events other than
/// credential updates are stale once the connection is gone.
async fn save_queued_creds(events: &mut mpsc::Receiver<SessionEvent>, auth: &dyn AuthState) {
    while let Ok(event) = events.try_recv() {
        if event == SessionEvent::CredsUpdate {
            save_creds(auth).await;
        }
    }
}
