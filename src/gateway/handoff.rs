//! Credential hand-off once the connection opens.

use std::path::Path;
use tracing::{info, warn};
use wapair_core::config::SessionConfig;
use wapair_core::error::PairError;
use wapair_core::session::normalize_user_jid;
use wapair_core::traits::{AuthState, MessagingSession};

/// Send the exported credentials and the deletion notice to the account's own chat.
///
/// The group join in between is best effort.
pub async fn deliver_credentials(
    session: &dyn MessagingSession,
    auth: &dyn AuthState,
    config: &SessionConfig,
) -> Result<(), PairError> {
    let own = session
        .own_jid()
        .await
        .ok_or_else(|| PairError::Session("own JID unknown after connect".into()))?;
    let own = normalize_user_jid(&own);

    let creds = auth.export_credentials().await?;
    let first = session
        .send_text(&own, &config.credentials_message(&creds), None)
        .await?;
    info!("credentials sent to {own}");

    if let Some(code) = config.group_invite() {
        if let Err(e) = session.accept_group_invite(code).await {
            warn!("failed to join group: {e}");
        }
    }

    session
        .send_text(&own, &config.deletion_notice, Some(&first))
        .await?;
    Ok(())
}

/// Recursively delete the session directory; a missing directory is fine.
pub async fn remove_session_dir(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!("session directory {} removed", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
