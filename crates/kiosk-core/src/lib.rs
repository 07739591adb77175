// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Kiosk shop bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Kiosk workspace. The storage and channel
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KioskError;
pub use types::{
    AdapterType, ChatId, HealthStatus, InboundEvent, MessageRef, UserId, UserProfile,
};

// Re-export adapter traits at crate root.
pub use traits::{ChannelAdapter, ChatChannel, CommerceStore, PluginAdapter};
