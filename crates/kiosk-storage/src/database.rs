// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use kiosk_core::KioskError;
use tokio_rusqlite::Connection;

/// Handle to the bot's SQLite database.
///
/// Opening runs pending migrations and configures WAL mode before the async
/// connection is handed out.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, run migrations, set PRAGMAs.
    pub async fn open(path: &str) -> Result<Self, KioskError> {
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), KioskError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(KioskError::storage)?;
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
                .map_err(KioskError::storage)?;
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| KioskError::Internal(format!("migration task failed: {e}")))??;

        // tokio-rusqlite 0.7 surfaces the open failure as a plain rusqlite
        // error, unlike `call`.
        let conn = Connection::open(path).await.map_err(KioskError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        Ok(Self { conn })
    }

    /// The underlying async connection. Queries go through `call`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so all committed data lands in the main file.
    pub async fn close(&self) -> Result<(), KioskError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into the crate-wide storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> KioskError {
    KioskError::Storage {
        source: Box::new(e),
    }
}
