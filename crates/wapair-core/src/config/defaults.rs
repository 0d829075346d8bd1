//! Default value functions used by serde for config deserialization.

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8000
}

pub fn default_session_dir() -> String {
    "./sessions".to_string()
}

pub fn default_group_invite() -> Option<String> {
    Some("Jys7ROogzQBDe2R0LtUWnS".to_string())
}

pub fn default_credentials_template() -> String {
    "*_PREXZY-BOTS: Your credentials are below_*\n\n```{creds}```\n\n\
     *Keep this safe and do not share it with anyone.*"
        .to_string()
}

pub fn default_deletion_notice() -> String {
    "The session file has been securely deleted from the server.".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_base_delay_ms() -> u64 {
    1_000
}

pub fn default_max_delay_ms() -> u64 {
    30_000
}

pub fn default_reconnect_window_secs() -> u64 {
    300
}

pub fn default_retry_ttl_secs() -> u64 {
    600
}

pub fn default_version_url() -> String {
    "https://raw.githubusercontent.com/WhiskeySockets/Baileys/master/src/Defaults/baileys-version.json"
        .to_string()
}

pub fn default_fallback_version() -> [u32; 3] {
    [2, 3000, 1_015_901_307]
}

pub fn default_version_timeout_secs() -> u64 {
    10
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_library_log_level() -> String {
    "off".to_string()
}
