//! TOML configuration with serde defaults for every field.

mod defaults;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PairError;
use crate::session::{BrowserIdentity, ProtocolVersion};
use defaults::*;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub version: VersionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session directory, client identity, and hand-off messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_dir")]
    pub dir: String,
    #[serde(default)]
    pub browser: BrowserIdentity,
    /// Group joined after the credentials are delivered. Empty disables it.
    #[serde(default = "default_group_invite")]
    pub group_invite: Option<String>,
    /// Credentials message; `{creds}` is replaced with the exported credentials.
    #[serde(default = "default_credentials_template")]
    pub credentials_template: String,
    #[serde(default = "default_deletion_notice")]
    pub deletion_notice: String,
    /// Remove the session directory when the device is logged out (401).
    #[serde(default = "default_true")]
    pub clear_on_logout: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
            browser: BrowserIdentity::default(),
            group_invite: default_group_invite(),
            credentials_template: default_credentials_template(),
            deletion_notice: default_deletion_notice(),
            clear_on_logout: true,
        }
    }
}

impl SessionConfig {
    pub fn session_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.dir))
    }

    pub fn credentials_message(&self, creds: &str) -> String {
        self.credentials_template.replace("{creds}", creds)
    }

    /// Configured invite code, ignoring blank values.
    pub fn group_invite(&self) -> Option<&str> {
        self.group_invite
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Backoff between reconnect attempts after a non-401 close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Give up after this many attempts inside the window. Unset retries forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Attempts older than this no longer count toward backoff.
    #[serde(default = "default_reconnect_window_secs")]
    pub window_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: None,
            window_secs: default_reconnect_window_secs(),
        }
    }
}

impl ReconnectConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Message retry-counter cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_retry_ttl_secs")]
    pub retry_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retry_ttl_secs: default_retry_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn retry_ttl(&self) -> Duration {
        Duration::from_secs(self.retry_ttl_secs)
    }
}

/// Where to look up the current web client version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    #[serde(default = "default_version_url")]
    pub url: String,
    #[serde(default = "default_fallback_version")]
    pub fallback: [u32; 3],
    #[serde(default = "default_version_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            url: default_version_url(),
            fallback: default_fallback_version(),
            timeout_secs: default_version_timeout_secs(),
        }
    }
}

impl VersionConfig {
    pub fn fallback_version(&self) -> ProtocolVersion {
        ProtocolVersion(self.fallback)
    }
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Level for the messaging library's own targets; `off` silences them.
    #[serde(default = "default_library_log_level")]
    pub library_level: String,
    /// Also write daily-rotated log files here.
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            library_level: default_library_log_level(),
            dir: None,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive string combining both levels.
    pub fn filter_directive(&self) -> String {
        format!(
            "{},whatsapp_rust={lib},wacore={lib},wacore_binary={lib}",
            self.level,
            lib = self.library_level
        )
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, falling back to defaults if missing.
pub fn load(path: &str) -> Result<Config, PairError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| PairError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| PairError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
