// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User tracking queries: upserts, broadcast target listing, block flags.

use kiosk_core::KioskError;
use kiosk_core::types::{ShopUser, UserId, UserProfile};
use rusqlite::params;

use crate::database::Database;

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ShopUser> {
    Ok(ShopUser {
        user_id: UserId(row.get(0)?),
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        is_blocked: row.get(4)?,
        created_at: row.get(5)?,
        last_activity: row.get(6)?,
    })
}

const USER_COLS: &str =
    "user_id, username, first_name, last_name, is_blocked, created_at, last_activity";

/// Insert or refresh a user profile, bumping `last_activity` either way.
///
/// The block flag is never touched here: a blocked user who somehow talks to
/// the bot again stays excluded from broadcasts.
pub async fn upsert_user(db: &Database, profile: &UserProfile) -> Result<(), KioskError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, username, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     username = excluded.username,
                     first_name = excluded.first_name,
                     last_name = excluded.last_name,
                     last_activity = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    profile.id.0,
                    profile.username,
                    profile.first_name,
                    profile.last_name,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All non-blocked users in ascending id order, so repeated broadcasts walk
/// the audience in a stable sequence.
pub async fn list_active_users(db: &Database) -> Result<Vec<ShopUser>, KioskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLS} FROM users WHERE is_blocked = 0 ORDER BY user_id ASC"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn count_active_users(db: &Database) -> Result<u64, KioskError> {
    db.connection()
        .call(|conn| {
            let count =
                conn.query_row("SELECT COUNT(*) FROM users WHERE is_blocked = 0", [], |row| {
                    row.get(0)
                })?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Permanently flag a user as having blocked the bot.
pub async fn mark_user_blocked(db: &Database, user_id: UserId) -> Result<(), KioskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET is_blocked = 1 WHERE user_id = ?1",
                params![user_id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
