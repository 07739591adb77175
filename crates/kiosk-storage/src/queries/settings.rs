// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Singleton bot settings.

use kiosk_core::KioskError;
use kiosk_core::types::BotSettings;
use rusqlite::params;

use crate::database::Database;

/// Read the settings singleton. The row is seeded by the initial migration,
/// so this never returns "missing".
pub async fn get_settings(db: &Database) -> Result<BotSettings, KioskError> {
    db.connection()
        .call(|conn| {
            let settings = conn.query_row(
                "SELECT welcome_message, updated_at FROM bot_settings WHERE id = 1",
                [],
                |row| {
                    Ok(BotSettings {
                        welcome_message: row.get(0)?,
                        updated_at: row.get(1)?,
                    })
                },
            )?;
            Ok(settings)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_welcome_message(db: &Database, message: &str) -> Result<(), KioskError> {
    let message = message.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE bot_settings
                 SET welcome_message = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = 1",
                params![message],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
