//! Connection lifecycle model shared by the gateway and messaging adapters.

use serde::{Deserialize, Serialize};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Close,
}

/// Status codes attached to a closed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    ConnectionClosed,
    ConnectionLost,
    LoggedOut,
    Forbidden,
    MultideviceMismatch,
    ConnectionReplaced,
    BadSession,
    UnavailableService,
    RestartRequired,
}

impl DisconnectReason {
    pub fn status_code(self) -> u16 {
        match self {
            Self::ConnectionClosed => 428,
            Self::ConnectionLost => 408,
            Self::LoggedOut => 401,
            Self::Forbidden => 403,
            Self::MultideviceMismatch => 411,
            Self::ConnectionReplaced => 440,
            Self::BadSession => 500,
            Self::UnavailableService => 503,
            Self::RestartRequired => 515,
        }
    }

    pub fn from_status(code: u16) -> Option<Self> {
        Some(match code {
            428 => Self::ConnectionClosed,
            408 => Self::ConnectionLost,
            401 => Self::LoggedOut,
            403 => Self::Forbidden,
            411 => Self::MultideviceMismatch,
            440 => Self::ConnectionReplaced,
            500 => Self::BadSession,
            503 => Self::UnavailableService,
            515 => Self::RestartRequired,
            _ => return None,
        })
    }
}

/// Details of why a connection closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub status_code: u16,
    pub message: String,
}

impl Disconnect {
    pub fn new(reason: DisconnectReason, message: impl Into<String>) -> Self {
        Self {
            status_code: reason.status_code(),
            message: message.into(),
        }
    }
}

/// A connection lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionUpdate {
    pub connection: ConnectionState,
    pub last_disconnect: Option<Disconnect>,
}

impl ConnectionUpdate {
    pub fn open() -> Self {
        Self {
            connection: ConnectionState::Open,
            last_disconnect: None,
        }
    }

    pub fn close(reason: DisconnectReason, message: impl Into<String>) -> Self {
        Self {
            connection: ConnectionState::Close,
            last_disconnect: Some(Disconnect::new(reason, message)),
        }
    }

    /// Status code of the last disconnect, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.last_disconnect.as_ref().map(|d| d.status_code)
    }

    /// A 401 close means the linked device was removed; reconnecting is pointless.
    pub fn is_logged_out(&self) -> bool {
        self.connection == ConnectionState::Close
            && self.status_code() == Some(DisconnectReason::LoggedOut.status_code())
    }
}

/// Events emitted by a live messaging session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connection(ConnectionUpdate),
    /// Raw pairing code, not yet grouped.
    PairingCode(String),
    /// QR payload for terminal linking.
    Qr(String),
    /// Credentials changed and should be persisted.
    CredsUpdate,
}

/// Identifies a sent message so it can be quoted later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    pub id: String,
    pub remote_jid: String,
    pub text: String,
}

/// Browser identity announced to WhatsApp as `(os, browser, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserIdentity {
    pub os: String,
    pub browser: String,
    pub version: String,
}

impl BrowserIdentity {
    /// Windows desktop identity for the given browser name.
    pub fn windows(browser: &str) -> Self {
        Self {
            os: "Windows".to_string(),
            browser: browser.to_string(),
            version: "10.0.22631".to_string(),
        }
    }
}

impl Default for BrowserIdentity {
    fn default() -> Self {
        Self::windows("Firefox")
    }
}

/// Protocol version triple reported by the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion(pub [u32; 3]);

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}.{b}.{c}")
    }
}

/// Reduce a JID to its bare user form: `123:4@s.whatsapp.net` becomes `123@s.whatsapp.net`.
pub fn normalize_user_jid(jid: &str) -> String {
    let (user, server) = jid.split_once('@').unwrap_or((jid, "s.whatsapp.net"));
    let user = user.split([':', '.']).next().unwrap_or(user);
    format!("{user}@{server}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip_through_reason() {
        for code in [401u16, 403, 408, 411, 428, 440, 500, 503, 515] {
            let reason = DisconnectReason::from_status(code).unwrap();
            assert_eq!(reason.status_code(), code);
        }
        assert!(DisconnectReason::from_status(200).is_none());
    }

    #[test]
    fn test_only_401_close_is_logged_out() {
        assert!(ConnectionUpdate::close(DisconnectReason::LoggedOut, "").is_logged_out());
        assert!(!ConnectionUpdate::close(DisconnectReason::ConnectionClosed, "").is_logged_out());
        assert!(!ConnectionUpdate::open().is_logged_out());
    }

    #[test]
    fn test_normalize_user_jid() {
        assert_eq!(
            normalize_user_jid("2349159895444:12@s.whatsapp.net"),
            "2349159895444@s.whatsapp.net"
        );
        assert_eq!(
            normalize_user_jid("2349159895444@s.whatsapp.net"),
            "2349159895444@s.whatsapp.net"
        );
        assert_eq!(normalize_user_jid("2349159895444"), "2349159895444@s.whatsapp.net");
    }

    #[test]
    fn test_default_browser_is_windows_firefox() {
        let b = BrowserIdentity::default();
        assert_eq!(b.os, "Windows");
        assert_eq!(b.browser, "Firefox");
    }

    #[test]
    fn test_protocol_version_display() {
        assert_eq!(ProtocolVersion([2, 3000, 1015901307]).to_string(), "2.3000.1015901307");
    }
}
