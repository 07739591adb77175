// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Throttled fan-out of a broadcast to every active user.
//!
//! Runs detached from the dialog that confirmed the broadcast: once sending
//! starts there is no cancellation, only completion. Recipients who blocked
//! the bot are marked so they drop out of future target lists.

use std::sync::Arc;
use std::time::Duration;

use kiosk_core::error::KioskError;
use kiosk_core::traits::{ChatChannel, CommerceStore};
use kiosk_core::types::{BroadcastStatus, ChatId};
use tracing::{error, info, warn};

/// Pause after every delivery attempt, keeping well under the Bot API's
/// ~30 messages/second ceiling.
pub const SEND_DELAY: Duration = Duration::from_millis(50);

/// Progress is persisted and reported to the admin every this many attempts.
pub const PROGRESS_BATCH: usize = 10;

/// Executes one broadcast end to end: load targets, fan out, track counters.
#[derive(Clone)]
pub struct BroadcastExecutor {
    store: Arc<dyn CommerceStore>,
    channel: Arc<dyn ChatChannel>,
}

impl BroadcastExecutor {
    pub fn new(store: Arc<dyn CommerceStore>, channel: Arc<dyn ChatChannel>) -> Self {
        Self { store, channel }
    }

    /// Run the broadcast, reporting progress to `admin_chat`.
    ///
    /// Never returns an error: failures are logged and reported to the admin
    /// chat, since by the time this runs nobody is awaiting the result.
    pub async fn execute(&self, broadcast_id: i64, admin_chat: ChatId) {
        if let Err(e) = self.run(broadcast_id, admin_chat).await {
            error!(broadcast_id, error = %e, "broadcast failed to run");
            let _ = self
                .channel
                .send_text(admin_chat, "❌ The broadcast could not be completed.")
                .await;
        }
    }

    async fn run(&self, broadcast_id: i64, admin_chat: ChatId) -> Result<(), KioskError> {
        let broadcast = self
            .store
            .get_broadcast(broadcast_id)
            .await?
            .ok_or_else(|| KioskError::Internal(format!("broadcast {broadcast_id} not found")))?;

        let photos = match self.store.list_broadcast_photos(broadcast_id).await {
            Ok(photos) => photos,
            Err(e) => {
                warn!(broadcast_id, error = %e, "could not load broadcast photos, sending text only");
                Vec::new()
            }
        };
        let photo = photos.first();

        let targets = self.store.list_active_users().await?;
        let total = targets.len() as u32;

        self.store
            .update_broadcast_status(broadcast_id, BroadcastStatus::Sending, total, 0, 0)
            .await?;
        info!(broadcast_id, total, "broadcast started");

        let mut sent: u32 = 0;
        let mut failed: u32 = 0;

        for (i, target) in targets.iter().enumerate() {
            let chat = ChatId(target.user_id.0);
            let result = match photo {
                Some(photo) => self
                    .channel
                    .send_photo(chat, &photo.file_id, Some(&broadcast.text), None)
                    .await,
                None => self.channel.send_html(chat, &broadcast.text, None).await,
            };

            match result {
                Ok(_) => sent += 1,
                Err(KioskError::RecipientBlocked) => {
                    failed += 1;
                    if let Err(e) = self.store.mark_user_blocked(target.user_id).await {
                        warn!(user = target.user_id.0, error = %e, "could not mark user blocked");
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(user = target.user_id.0, error = %e, "broadcast delivery failed");
                }
            }

            tokio::time::sleep(SEND_DELAY).await;

            let done = i + 1;
            if done % PROGRESS_BATCH == 0 || done == targets.len() {
                if let Err(e) = self
                    .store
                    .update_broadcast_status(
                        broadcast_id,
                        BroadcastStatus::Sending,
                        total,
                        sent,
                        failed,
                    )
                    .await
                {
                    warn!(broadcast_id, error = %e, "could not persist broadcast progress");
                }
                let percent = done as f64 / targets.len() as f64 * 100.0;
                let _ = self
                    .channel
                    .send_text(
                        admin_chat,
                        &format!("📤 Sending... {done}/{total} ({percent:.0}%)"),
                    )
                    .await;
            }
        }

        // A broadcast that reached nobody is a failure, including the
        // zero-recipient case.
        let status = if sent > 0 {
            BroadcastStatus::Completed
        } else {
            BroadcastStatus::Failed
        };
        self.store
            .update_broadcast_status(broadcast_id, status, total, sent, failed)
            .await?;
        info!(broadcast_id, sent, failed, ?status, "broadcast finished");

        let summary = format!(
            "✅ Broadcast finished\n\n\
             📬 Delivered: {sent}\n\
             ❌ Failed: {failed}\n\
             👥 Total recipients: {total}"
        );
        let _ = self.channel.send_text(admin_chat, &summary).await;
        Ok(())
    }
}
