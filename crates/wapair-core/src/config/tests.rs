use super::*;

#[test]
fn test_defaults_match_original_behaviour() {
    let cfg = Config::default();
    assert_eq!(cfg.session.dir, "./sessions");
    assert_eq!(cfg.session.browser, BrowserIdentity::windows("Firefox"));
    assert_eq!(cfg.session.group_invite(), Some("Jys7ROogzQBDe2R0LtUWnS"));
    assert!(cfg.session.clear_on_logout);
    assert!(cfg.reconnect.max_attempts.is_none());
    assert_eq!(cfg.log.library_level, "off");
}

#[test]
fn test_partial_toml_fills_defaults() {
    let toml_str = r#"
        [server]
        port = 9000

        [reconnect]
        max_attempts = 5
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.reconnect.max_attempts, Some(5));
    assert_eq!(cfg.reconnect.base_delay_ms, 1_000);
    assert_eq!(cfg.session.deletion_notice, default_deletion_notice());
}

#[test]
fn test_blank_group_invite_disables_join() {
    let toml_str = r#"
        [session]
        group_invite = "  "
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.session.group_invite(), None);
}

#[test]
fn test_credentials_message_substitutes_creds() {
    let session = SessionConfig {
        credentials_template: "creds: ```{creds}```".into(),
        ..Default::default()
    };
    assert_eq!(session.credentials_message("abc"), "creds: ```abc```");
}

#[test]
fn test_default_credentials_message_wraps_creds() {
    let msg = SessionConfig::default().credentials_message("SECRET");
    assert!(msg.contains("```SECRET```"));
    assert!(msg.ends_with("*Keep this safe and do not share it with anyone.*"));
}

#[test]
fn test_filter_directive_silences_library() {
    let log = LogConfig::default();
    assert_eq!(
        log.filter_directive(),
        "info,whatsapp_rust=off,wacore=off,wacore_binary=off"
    );
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let cfg = load("/nonexistent/__wapair_config__.toml").unwrap();
    assert_eq!(cfg.server.port, 8000);
}

#[test]
fn test_load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[session]\ndir = \"/tmp/wapair-sessions\"\n").unwrap();
    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.session.session_dir(), PathBuf::from("/tmp/wapair-sessions"));
}

#[test]
fn test_load_rejects_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();
    assert!(matches!(
        load(path.to_str().unwrap()),
        Err(PairError::Config(_))
    ));
}

#[test]
fn test_shellexpand_home() {
    if let Some(home) = std::env::var_os("HOME") {
        assert_eq!(
            shellexpand("~/sessions"),
            format!("{}/sessions", home.to_string_lossy())
        );
    }
    assert_eq!(shellexpand("./sessions"), "./sessions");
}
