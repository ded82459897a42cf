// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./unibox.toml` > `~/.config/unibox/unibox.toml` > `/etc/unibox/unibox.toml`
//! with environment variable overrides via `UNIBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::UniboxConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/unibox/unibox.toml` (system-wide)
/// 3. `~/.config/unibox/unibox.toml` (user XDG config)
/// 4. `./unibox.toml` (local directory)
/// 5. `UNIBOX_*` environment variables
pub fn load_config() -> Result<UniboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<UniboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UniboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<UniboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UniboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(UniboxConfig::default()))
        .merge(Toml::file("/etc/unibox/unibox.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("unibox/unibox.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("unibox.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `UNIBOX_FEEDS_SOCIAL_NETWORK_ENABLED` must map to
/// `feeds.social_network.enabled`, not `feeds.social.network.enabled`.
fn env_provider() -> Env {
    Env::prefixed("UNIBOX_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name to a dotted config path.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for channel in ["social_network", "chat", "email"] {
        let prefix = format!("feeds_{channel}_");
        if let Some(rest) = key.strip_prefix(&prefix) {
            return format!("feeds.{channel}.{rest}");
        }
    }
    key.replacen("general_", "general.", 1)
        .replacen("backend_", "backend.", 1)
        .replacen("storage_", "storage.", 1)
        .replacen("unread_", "unread.", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("backend_base_url"), "backend.base_url");
        assert_eq!(map_env_key("unread_chat_zero_guard"), "unread.chat_zero_guard");
        assert_eq!(map_env_key("general_log_level"), "general.log_level");
    }

    #[test]
    fn env_keys_map_nested_feed_sections() {
        assert_eq!(
            map_env_key("feeds_social_network_enabled"),
            "feeds.social_network.enabled"
        );
        assert_eq!(map_env_key("feeds_chat_event"), "feeds.chat.event");
    }
}
