//! Client lifecycle: build the bot, run it, and forward its events.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use wacore::types::events::Event;
use wapair_core::error::PairError;
use wapair_core::session::{ProtocolVersion, SessionEvent};
use wapair_core::traits::{ConnectOptions, SessionHandle};
use waproto::whatsapp::device_props::{AppVersion, PlatformType};
use whatsapp_rust::bot::Bot;
use whatsapp_rust::pair_code::PairCodeOptions;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

use super::events::map_event;
use super::qr::print_qr;
use super::session::WhatsAppSession;
use crate::session_store::FileSessionStore;

const EVENT_BUFFER: usize = 64;

/// Platform announced for a browser name; unknown browsers fall back to desktop.
pub(super) fn platform_type(browser: &str) -> PlatformType {
    match browser.to_ascii_lowercase().as_str() {
        "chrome" => PlatformType::Chrome,
        "firefox" => PlatformType::Firefox,
        "safari" => PlatformType::Safari,
        "edge" => PlatformType::Edge,
        "opera" => PlatformType::Opera,
        _ => PlatformType::Desktop,
    }
}

fn app_version(version: ProtocolVersion) -> AppVersion {
    let [primary, secondary, tertiary] = version.0;
    AppVersion {
        primary: Some(primary),
        secondary: Some(secondary),
        tertiary: Some(tertiary),
        ..Default::default()
    }
}

/// Build a bot bound to `store`, run it in the background, and return the
/// session together with its event stream.
///
/// Library events are mapped to [`SessionEvent`]s. Device record changes
/// staged in the store surface as [`SessionEvent::CredsUpdate`].
pub(crate) async fn start_client(
    store: Arc<FileSessionStore>,
    options: ConnectOptions,
) -> Result<SessionHandle, PairError> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    info!(
        "WhatsApp client building (session: {}, version {})...",
        store.dir().display(),
        options.version
    );

    let tx_events = tx.clone();
    let print_qr_codes = options.print_qr;
    let mut builder = Bot::builder()
        .with_backend(store.clone())
        .with_transport_factory(TokioWebSocketTransportFactory::new())
        .with_http_client(UreqHttpClient::new())
        .with_device_props(
            Some(options.browser.os.clone()),
            Some(app_version(options.version)),
            Some(platform_type(&options.browser.browser)),
        )
        .on_event(move |event, _client| {
            let tx = tx_events.clone();
            async move {
                if print_qr_codes {
                    if let Event::PairingQrCode { code, .. } = &event {
                        print_qr(code);
                    }
                }
                if let Some(mapped) = map_event(&event) {
                    if tx.send(mapped).await.is_err() {
                        debug!("session event dropped, receiver gone");
                    }
                }
            }
        });

    if let Some(phone) = options.pairing_phone.clone() {
        info!("WhatsApp pair-code flow enabled");
        builder = builder.with_pair_code(PairCodeOptions {
            phone_number: phone,
            ..Default::default()
        });
    }

    let mut bot = builder
        .build()
        .await
        .map_err(|e| PairError::Session(format!("client build failed: {e}")))?;
    let client = bot.client();
    let run_handle = bot
        .run()
        .await
        .map_err(|e| PairError::Session(format!("client start failed: {e}")))?;

    let creds_forward = tokio::spawn(forward_creds_updates(store.subscribe_creds(), tx));

    let session = WhatsAppSession::new(
        client,
        store,
        options.retry_cache.clone(),
        vec![run_handle, creds_forward],
    );

    Ok(SessionHandle {
        session: Arc::new(session),
        events: rx,
    })
}

async fn forward_creds_updates(
    mut updates: broadcast::Receiver<()>,
    tx: mpsc::Sender<SessionEvent>,
) {
    loop {
        match updates.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                if tx.send(SessionEvent::CredsUpdate).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
