// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error reporting.

use thiserror::Error;

/// A single configuration problem, suitable for direct display.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parsing or type coercion failure reported by Figment.
    #[error("config: {0}")]
    Figment(#[from] figment::Error),

    /// A loaded value violates an invariant serde cannot express.
    #[error("config: {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Print every collected config error to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{error}");
    }
    eprintln!(
        "{} configuration error{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}
