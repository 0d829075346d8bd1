//! Translate library events into session lifecycle events.

use tracing::{info, warn};
use wacore::types::events::Event;
use wapair_core::session::{ConnectionUpdate, DisconnectReason, SessionEvent};

/// Map a library event to the session event it represents, if any.
pub(super) fn map_event(event: &Event) -> Option<SessionEvent> {
    match event {
        Event::Connected(_) => {
            info!("WhatsApp connected");
            Some(SessionEvent::Connection(ConnectionUpdate::open()))
        }
        Event::PairingCode { code, .. } => {
            info!("WhatsApp pairing code received");
            Some(SessionEvent::PairingCode(code.clone()))
        }
        Event::PairingQrCode { code, .. } => {
            info!("WhatsApp QR code generated (scan to pair)");
            Some(SessionEvent::Qr(code.clone()))
        }
        Event::PairSuccess(_) => {
            info!("WhatsApp pairing successful");
            None
        }
        Event::LoggedOut(_) => {
            warn!("WhatsApp logged out, session invalidated");
            Some(SessionEvent::Connection(ConnectionUpdate::close(
                DisconnectReason::LoggedOut,
                "logged out",
            )))
        }
        Event::Disconnected(_) => {
            warn!("WhatsApp disconnected");
            Some(SessionEvent::Connection(ConnectionUpdate::close(
                DisconnectReason::ConnectionClosed,
                "Connection Closed",
            )))
        }
        Event::StreamError(stream_error) => {
            warn!("WhatsApp stream error: {stream_error:?}");
            Some(SessionEvent::Connection(ConnectionUpdate::close(
                DisconnectReason::RestartRequired,
                format!("stream error: {stream_error:?}"),
            )))
        }
        _ => None,
    }
}
