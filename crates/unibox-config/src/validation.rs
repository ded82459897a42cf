// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL shape, non-empty paths, and known log levels.

use unibox_core::Channel;

use crate::diagnostic::ConfigError;
use crate::model::UniboxConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &UniboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "general.log_level `{}` must be one of {}",
            config.general.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let base_url = config.backend.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::validation("backend.base_url must not be empty"));
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "backend.base_url `{base_url}` must start with http:// or https://"
        )));
    } else if base_url.ends_with('/') {
        errors.push(ConfigError::validation(format!(
            "backend.base_url `{base_url}` must not end with a slash"
        )));
    }

    if config.backend.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "backend.request_timeout_secs must be greater than zero",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.database_path must not be empty"));
    }

    for channel in Channel::ALL {
        let feed = config.feeds.for_channel(channel);
        if !feed.path.starts_with('/') {
            errors.push(ConfigError::validation(format!(
                "feeds.{channel}.path `{}` must start with `/`",
                feed.path
            )));
        }
        if feed.event.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "feeds.{channel}.event must not be empty"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&UniboxConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = UniboxConfig::default();
        config.backend.base_url = "localhost:8080".into();
        config.backend.request_timeout_secs = 0;
        config.storage.database_path = "  ".into();
        config.feeds.chat.path = "whatsapp/notifications".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn rejects_trailing_slash_in_base_url() {
        let mut config = UniboxConfig::default();
        config.backend.base_url = "http://localhost:8080/".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("slash"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = UniboxConfig::default();
        config.general.log_level = "verbose".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_feed_event() {
        let mut config = UniboxConfig::default();
        config.feeds.email.event = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("feeds.email.event"));
    }
}
