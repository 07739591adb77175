// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Kiosk shop bot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed CRUD operations for the
//! catalog, orders, users, settings, and broadcasts.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod order_id;
pub mod queries;
#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::SqliteStore;
pub use database::Database;
