// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable order id generation.
//!
//! Format: 3-letter shop prefix, then the UTC date as YYMMDD, then a
//! zero-padded random 3-digit suffix, e.g. `WOW260830042`.

use chrono::Utc;
use rand::Rng;

/// Generate a fresh order id with the given shop prefix.
pub fn generate_order_id(prefix: &str) -> String {
    let date = Utc::now().format("%y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("{prefix}{date}{suffix:03}")
}
