//! Lookup of the current WhatsApp Web client version.
//!
//! The version document is a small JSON file of the form
//! `{"version": [2, 3000, 1015901307]}`. Any failure falls back to the
//! configured version so session setup never blocks on it.

use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use wapair_core::config::VersionConfig;
use wapair_core::session::ProtocolVersion;

#[derive(Deserialize)]
struct VersionDocument {
    version: [u32; 3],
}

/// Parse a version document body.
pub fn parse_version_document(body: &str) -> Result<ProtocolVersion, serde_json::Error> {
    let doc: VersionDocument = serde_json::from_str(body)?;
    Ok(ProtocolVersion(doc.version))
}

/// Fetch the latest version, or return the configured fallback.
pub async fn fetch_latest_version(http: &reqwest::Client, config: &VersionConfig) -> ProtocolVersion {
    let fallback = config.fallback_version();
    let resp = http
        .get(&config.url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await;

    let body = match resp {
        Ok(r) if r.status().is_success() => r.text().await,
        Ok(r) => {
            warn!("version lookup returned {}, using {fallback}", r.status());
            return fallback;
        }
        Err(e) => {
            warn!("version lookup failed: {e}, using {fallback}");
            return fallback;
        }
    };

    match body.map_err(|e| e.to_string()).and_then(|b| {
        parse_version_document(&b).map_err(|e| e.to_string())
    }) {
        Ok(version) => {
            info!("using WA v{version}");
            version
        }
        Err(e) => {
            warn!("version document unreadable: {e}, using {fallback}");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_document() {
        let v = parse_version_document(r#"{"version":[2,3000,1015901307]}"#).unwrap();
        assert_eq!(v, ProtocolVersion([2, 3000, 1015901307]));
    }

    #[test]
    fn test_parse_version_document_rejects_short_triple() {
        assert!(parse_version_document(r#"{"version":[2,3000]}"#).is_err());
        assert!(parse_version_document("not json").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_url_falls_back() {
        let config = VersionConfig {
            url: "http://127.0.0.1:9/version.json".into(),
            fallback: [2, 1, 3],
            timeout_secs: 2,
        };
        let v = fetch_latest_version(&reqwest::Client::new(), &config).await;
        assert_eq!(v, ProtocolVersion([2, 1, 3]));
    }
}
