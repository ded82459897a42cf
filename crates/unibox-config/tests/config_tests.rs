// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Unibox configuration system.

use unibox_config::diagnostic::ConfigError;
use unibox_config::model::UniboxConfig;
use unibox_config::{
    load_and_validate_path, load_and_validate_str, load_config, load_config_from_str,
};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[general]
log_level = "debug"

[backend]
base_url = "https://inbox.example.com"
request_timeout_secs = 10

[storage]
database_path = "/tmp/unibox-test.db"
wal_mode = false

[feeds.chat]
enabled = false
path = "/wa/events"
event = "chatSnapshot"

[unread]
chat_zero_guard = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.backend.base_url, "https://inbox.example.com");
    assert_eq!(config.backend.request_timeout_secs, 10);
    assert_eq!(config.storage.database_path, "/tmp/unibox-test.db");
    assert!(!config.storage.wal_mode);
    assert!(!config.feeds.chat.enabled);
    assert_eq!(config.feeds.chat.path, "/wa/events");
    assert_eq!(config.feeds.chat.event, "chatSnapshot");
    assert!(!config.unread.chat_zero_guard);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    let defaults = UniboxConfig::default();
    assert_eq!(config.backend.base_url, defaults.backend.base_url);
    assert_eq!(config.feeds.social_network.event, "facebookConversations");
    assert_eq!(config.feeds.chat.path, "/whatsapp/notifications");
    assert_eq!(config.feeds.email.event, "emailConversations");
    assert!(config.unread.chat_zero_guard);
}

#[test]
fn partial_feed_section_keeps_channel_defaults() {
    let toml = r#"
[feeds.email]
enabled = false
"#;
    let config = load_config_from_str(toml).expect("partial feed section");
    assert!(!config.feeds.email.enabled);
    assert_eq!(config.feeds.email.path, "/email/notifications");
    assert_eq!(config.feeds.email.event, "emailConversations");
}

#[test]
fn unknown_key_in_backend_is_reported_with_suggestion() {
    let toml = r#"
[backend]
base_ulr = "http://localhost:9000"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "base_ulr");
            assert_eq!(suggestion.as_deref(), Some("base_url"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[backend]
request_timeout_secs = "soon"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[backend]
base_url = ""

[feeds.social_network]
path = "facebook/notifications"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn load_from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unibox.toml");
    std::fs::write(&path, "[storage]\ndatabase_path = \"/var/lib/unibox.db\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.storage.database_path, "/var/lib/unibox.db");
}

#[test]
fn env_vars_override_local_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "unibox.toml",
            "[backend]\nbase_url = \"http://from-file:1\"\n",
        )?;
        jail.set_env("UNIBOX_BACKEND_BASE_URL", "http://from-env:2");
        jail.set_env("UNIBOX_FEEDS_SOCIAL_NETWORK_ENABLED", "false");
        jail.set_env("UNIBOX_UNREAD_CHAT_ZERO_GUARD", "false");

        let config = load_config()?;
        assert_eq!(config.backend.base_url, "http://from-env:2");
        assert!(!config.feeds.social_network.enabled);
        assert!(config.feeds.chat.enabled);
        assert!(!config.unread.chat_zero_guard);
        Ok(())
    });
}

#[test]
fn config_serializes_to_json() {
    let json = serde_json::to_value(UniboxConfig::default()).unwrap();
    assert_eq!(json["feeds"]["chat"]["event"], "whatsappConversations");
    assert_eq!(json["unread"]["chat_zero_guard"], true);
}
