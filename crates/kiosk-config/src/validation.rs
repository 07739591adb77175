// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of loaded configuration.
//!
//! Checks invariants that serde cannot express: value ranges, formats, and
//! cross-field consistency. Serve-time requirements (bot token, admin ids,
//! payment card) are checked by the binary when starting the bot so that a
//! default config remains loadable for `kiosk config check`.

use crate::diagnostic::ConfigError;
use crate::model::{KioskConfig, LimitProfile};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a loaded configuration, collecting all problems.
pub fn validate_config(config: &KioskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let prefix = &config.bot.order_prefix;
    if prefix.len() != 3 || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push(ConfigError::invalid(
            "bot.order_prefix",
            format!("must be exactly 3 ASCII letters, got {prefix:?}"),
        ));
    }

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "bot.log_level",
            format!(
                "must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                config.bot.log_level
            ),
        ));
    }

    if config.storage.database_path.is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }

    validate_limit_profile("limits.standard", &config.limits.standard, &mut errors);
    validate_limit_profile("limits.privileged", &config.limits.privileged, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_limit_profile(section: &str, profile: &LimitProfile, errors: &mut Vec<ConfigError>) {
    if profile.window_secs == 0 {
        errors.push(ConfigError::invalid(
            format!("{section}.window_secs"),
            "must be greater than zero",
        ));
    }
    if profile.ban_secs == 0 {
        errors.push(ConfigError::invalid(
            format!("{section}.ban_secs"),
            "must be greater than zero",
        ));
    }
    if profile.sweep_secs == 0 {
        errors.push(ConfigError::invalid(
            format!("{section}.sweep_secs"),
            "must be greater than zero",
        ));
    }
    // max_requests == 0 is legal: it means every request is rejected.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate_config(&KioskConfig::default()).unwrap();
    }

    #[test]
    fn bad_order_prefix_is_rejected() {
        let mut config = KioskConfig::default();
        config.bot.order_prefix = "TOOLONG".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("order_prefix")));

        config.bot.order_prefix = "A1B".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = KioskConfig::default();
        config.bot.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("log_level"));
    }

    #[test]
    fn zero_window_is_rejected_but_zero_max_requests_is_not() {
        let mut config = KioskConfig::default();
        config.limits.standard.window_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = KioskConfig::default();
        config.limits.standard.max_requests = 0;
        validate_config(&config).unwrap();
    }

    #[test]
    fn all_problems_are_collected_at_once() {
        let mut config = KioskConfig::default();
        config.bot.order_prefix = "XXXX".into();
        config.bot.log_level = "loud".into();
        config.limits.privileged.sweep_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
