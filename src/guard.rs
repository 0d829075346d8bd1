//! Process-wide error guard.
//!
//! Connection churn produces a steady stream of transient errors that are
//! expected and harmless. Anything matching [`IGNORED_ERRORS`] is dropped;
//! everything else is logged.

use std::any::Any;
use std::fmt::Display;
use tracing::{error, trace};

pub const IGNORED_ERRORS: &[&str] = &[
    "conflict",
    "not-authorized",
    "Socket connection timeout",
    "rate-overlimit",
    "Connection Closed",
    "Timed Out",
    "Value not found",
];

pub fn is_benign(message: &str) -> bool {
    IGNORED_ERRORS.iter().any(|e| message.contains(e))
}

/// Log an error from a background task unless it is benign.
///
/// Returns `true` when the error was logged.
pub fn report(context: &str, err: &dyn Display) -> bool {
    let message = err.to_string();
    if is_benign(&message) {
        trace!("{context}: {message} (ignored)");
        false
    } else {
        error!("{context}: {message}");
        true
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Route panics through the same filter instead of the default stderr dump.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!(" at {}:{}", l.file(), l.line()))
            .unwrap_or_default();
        report("uncaught panic", &format!("{message}{location}"));
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_substrings_are_ignored() {
        assert!(is_benign("Error: Connection Closed by peer"));
        assert!(is_benign("stream:error conflict"));
        assert!(is_benign("rate-overlimit"));
        assert!(!report("ws", &"Timed Out waiting for frame"));
    }

    #[test]
    fn test_other_errors_are_logged() {
        assert!(!is_benign("disk full"));
        assert!(report("setup", &"disk full"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(!is_benign("connection closed"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
    }
}
