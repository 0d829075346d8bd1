//! Message construction and retry logic.

use std::time::Duration;
use tracing::{error, warn};
use wacore_binary::jid::Jid;
use wapair_core::cache::RetryCounterCache;
use wapair_core::error::PairError;
use wapair_core::session::MessageKey;
use waproto::whatsapp::message::ExtendedTextMessage;
use waproto::whatsapp::{ContextInfo, Message};
use whatsapp_rust::client::Client;

/// Delays before each retry: 500ms, 1s, 2s.
pub(super) const RETRY_DELAYS_MS: [u64; 3] = [500, 1000, 2000];

/// Build a text message, quoting `quoted` when given.
pub(super) fn text_message(text: &str, quoted: Option<&MessageKey>) -> Message {
    let Some(key) = quoted else {
        return Message {
            conversation: Some(text.to_string()),
            ..Default::default()
        };
    };

    let context = ContextInfo {
        stanza_id: Some(key.id.clone()),
        participant: Some(key.remote_jid.clone()),
        quoted_message: Some(Box::new(Message {
            conversation: Some(key.text.clone()),
            ..Default::default()
        })),
        ..Default::default()
    };
    Message {
        extended_text_message: Some(Box::new(ExtendedTextMessage {
            text: Some(text.to_string()),
            context_info: Some(Box::new(context)),
            ..Default::default()
        })),
        ..Default::default()
    }
}

/// Delay before the next attempt, or `None` once retries are exhausted.
///
/// `attempt` is the 1-based number of the attempt that just failed.
pub(super) fn retry_delay(attempt: u32) -> Option<Duration> {
    let idx = usize::try_from(attempt).ok()?.checked_sub(1)?;
    RETRY_DELAYS_MS.get(idx).map(|ms| Duration::from_millis(*ms))
}

/// Send a message with retry and exponential backoff.
///
/// Attempts are counted in `counter` under `key`, so a send that is retried
/// again shortly afterwards continues from the remaining budget instead of
/// starting over. The counter is cleared on success.
pub(super) async fn retry_send(
    client: &Client,
    jid: &Jid,
    msg: Message,
    counter: &RetryCounterCache,
    key: &str,
) -> Result<String, PairError> {
    let total = RETRY_DELAYS_MS.len() + 1;
    loop {
        let attempt = counter.increment(key.to_string());
        match client.send_message(jid.clone(), msg.clone()).await {
            Ok(msg_id) => {
                counter.remove(&key.to_string());
                return Ok(msg_id);
            }
            Err(e) => match retry_delay(attempt) {
                Some(delay) => {
                    warn!(
                        "whatsapp send attempt {attempt}/{total} failed: {e}, retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    error!("whatsapp send attempt {attempt}/{total} failed: {e}, giving up");
                    counter.remove(&key.to_string());
                    return Err(PairError::Session(format!(
                        "whatsapp send failed after {attempt} attempts: {e}"
                    )));
                }
            },
        }
    }
}
