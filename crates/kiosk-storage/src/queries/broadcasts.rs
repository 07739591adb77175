// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast lifecycle queries: drafts, photos, status transitions.

use kiosk_core::KioskError;
use kiosk_core::types::{Broadcast, BroadcastPhoto, BroadcastStatus, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_status;

fn broadcast_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Broadcast> {
    Ok(Broadcast {
        id: row.get(0)?,
        admin_id: UserId(row.get(1)?),
        text: row.get(2)?,
        status: parse_status(3, row.get(3)?)?,
        total_users: row.get(4)?,
        sent_count: row.get(5)?,
        failed_count: row.get(6)?,
        created_at: row.get(7)?,
        started_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

const BROADCAST_COLS: &str = "id, admin_id, text, status, total_users, sent_count, failed_count,
                              created_at, started_at, completed_at";

/// Create a broadcast in `draft` status and return the stored row.
pub async fn create_broadcast(
    db: &Database,
    admin_id: UserId,
    text: &str,
) -> Result<Broadcast, KioskError> {
    let text = text.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO broadcasts (admin_id, text) VALUES (?1, ?2)",
                params![admin_id.0, text],
            )?;
            let id = conn.last_insert_rowid();
            let broadcast = conn.query_row(
                &format!("SELECT {BROADCAST_COLS} FROM broadcasts WHERE id = ?1"),
                params![id],
                broadcast_from_row,
            )?;
            Ok(broadcast)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_broadcast(
    db: &Database,
    broadcast_id: i64,
) -> Result<Option<Broadcast>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BROADCAST_COLS} FROM broadcasts WHERE id = ?1"
            ))?;
            match stmt.query_row(params![broadcast_id], broadcast_from_row) {
                Ok(broadcast) => Ok(Some(broadcast)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update lifecycle status and counters.
///
/// `started_at` is stamped on the draft-to-sending transition and never
/// rewritten; `completed_at` is stamped when the status becomes terminal.
pub async fn update_broadcast_status(
    db: &Database,
    broadcast_id: i64,
    status: BroadcastStatus,
    total_users: u32,
    sent_count: u32,
    failed_count: u32,
) -> Result<(), KioskError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE broadcasts SET
                     status = ?1,
                     total_users = ?2,
                     sent_count = ?3,
                     failed_count = ?4,
                     started_at = CASE
                         WHEN status = 'draft' AND ?1 = 'sending'
                         THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         ELSE started_at
                     END,
                     completed_at = CASE
                         WHEN ?1 IN ('completed', 'failed')
                         THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         ELSE completed_at
                     END
                 WHERE id = ?5",
                params![status, total_users, sent_count, failed_count, broadcast_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a draft broadcast. Deleting a broadcast in any other status is an
/// error, as is deleting an unknown id. Photos go with it via cascade.
pub async fn delete_broadcast(db: &Database, broadcast_id: i64) -> Result<(), KioskError> {
    let deleted = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "DELETE FROM broadcasts WHERE id = ?1 AND status = 'draft'",
                params![broadcast_id],
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(KioskError::Storage {
            source: format!("broadcast {broadcast_id} not found or not a draft").into(),
        });
    }
    Ok(())
}

pub async fn add_broadcast_photo(
    db: &Database,
    broadcast_id: i64,
    file_id: &str,
    sort_order: i64,
) -> Result<(), KioskError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO broadcast_photos (broadcast_id, file_id, sort_order)
                 VALUES (?1, ?2, ?3)",
                params![broadcast_id, file_id, sort_order],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn list_broadcast_photos(
    db: &Database,
    broadcast_id: i64,
) -> Result<Vec<BroadcastPhoto>, KioskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, broadcast_id, file_id, sort_order, created_at
                 FROM broadcast_photos WHERE broadcast_id = ?1 ORDER BY sort_order, id",
            )?;
            let rows = stmt.query_map(params![broadcast_id], |row| {
                Ok(BroadcastPhoto {
                    id: row.get(0)?,
                    broadcast_id: row.get(1)?,
                    file_id: row.get(2)?,
                    sort_order: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            let mut photos = Vec::new();
            for row in rows {
                photos.push(row?);
            }
            Ok(photos)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
