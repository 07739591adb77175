// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Kiosk shop bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Kiosk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// serve-time requirements (bot token, admin ids, payment card) are checked
/// when the bot starts, not at load time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KioskConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rate limiter settings.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Administrator user ids. These identities bypass rate limiting and
    /// may invoke management operations.
    #[serde(default)]
    pub admin_ids: Vec<i64>,

    /// Card number shown in payment instructions.
    #[serde(default)]
    pub payment_card: String,

    /// 3-letter order id prefix.
    #[serde(default = "default_order_prefix")]
    pub order_prefix: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            admin_ids: Vec::new(),
            payment_card: String::new(),
            order_prefix: default_order_prefix(),
            log_level: default_log_level(),
        }
    }
}

fn default_order_prefix() -> String {
    "WOW".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required to serve.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "kiosk.db".to_string()
}

/// Rate limiter configuration, one profile per audience.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Limits applied to ordinary users.
    #[serde(default = "default_standard_limit")]
    pub standard: LimitProfile,

    /// Lenient limits applied to privileged identities.
    #[serde(default = "default_privileged_limit")]
    pub privileged: LimitProfile,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            standard: default_standard_limit(),
            privileged: default_privileged_limit(),
        }
    }
}

/// A single sliding-window limiter profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitProfile {
    /// Maximum accepted requests within the window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
    /// Ban duration in seconds once the window overflows.
    pub ban_secs: u64,
    /// Interval of the inactivity sweep in seconds.
    pub sweep_secs: u64,
}

fn default_standard_limit() -> LimitProfile {
    // 20 requests per minute, 5 minute ban, sweep every 10 minutes.
    LimitProfile {
        max_requests: 20,
        window_secs: 60,
        ban_secs: 300,
        sweep_secs: 600,
    }
}

fn default_privileged_limit() -> LimitProfile {
    LimitProfile {
        max_requests: 100,
        window_secs: 60,
        ban_secs: 60,
        sweep_secs: 600,
    }
}
