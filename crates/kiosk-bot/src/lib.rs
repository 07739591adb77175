// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Kiosk shop bot.
//!
//! The [`Dispatcher`] routes inbound messages and callback presses through
//! rate limiting, dialog state, and the command handlers; the
//! [`BroadcastExecutor`] fans announcements out to every active user. Both
//! are channel-agnostic and talk to collaborators only through the
//! `kiosk-core` traits.

pub mod broadcast;
pub mod dispatcher;
pub mod fsm;
mod handlers;
pub mod ratelimit;
#[cfg(test)]
pub(crate) mod testing;
pub mod validation;

pub use broadcast::BroadcastExecutor;
pub use dispatcher::Dispatcher;
pub use fsm::DialogManager;
pub use ratelimit::RateLimiter;
