// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kiosk.toml` > `~/.config/kiosk/kiosk.toml` >
//! `/etc/kiosk/kiosk.toml` with environment variable overrides via the
//! `KIOSK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KioskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kiosk/kiosk.toml` (system-wide)
/// 3. `~/.config/kiosk/kiosk.toml` (user XDG config)
/// 4. `./kiosk.toml` (local directory)
/// 5. `KIOSK_*` environment variables
pub fn load_config() -> Result<KioskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KioskConfig::default()))
        .merge(Toml::file("/etc/kiosk/kiosk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("kiosk/kiosk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("kiosk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<KioskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KioskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KioskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KioskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `KIOSK_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("KIOSK_").map(|key| {
        // Figment hands the key over before lowercasing it, so normalize
        // first. Example: KIOSK_TELEGRAM_BOT_TOKEN -> "telegram_bot_token".
        let key = key.as_str().to_ascii_lowercase();
        // Anchored prefix mapping: `bot_` must only match the section, not
        // the `bot_` embedded in `telegram_bot_token`.
        let mapped = [
            ("limits_standard_", "limits.standard."),
            ("limits_privileged_", "limits.privileged."),
            ("telegram_", "telegram."),
            ("storage_", "storage."),
            ("bot_", "bot."),
        ]
        .iter()
        .find_map(|(section, dotted)| {
            key.strip_prefix(section)
                .map(|rest| format!("{dotted}{rest}"))
        })
        .unwrap_or(key);
        mapped.into()
    })
}
