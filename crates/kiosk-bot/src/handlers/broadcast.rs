// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The three-step broadcast dialog: text, optional photo, confirmation.
//!
//! The draft broadcast row is created as soon as the text is accepted, so
//! cancelling must delete it. Confirmation detaches the send into the
//! executor; from that point the dialog is over and the broadcast runs to
//! completion on its own.

use kiosk_core::types::{Button, CallbackEvent, ChatId, IncomingMessage, Keyboard, UserId};
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::fsm::{BroadcastDraft, BroadcastStage, DialogState};
use crate::validation::{sanitize_html, validate_html};

const EXPIRED: &str = "⌛ This dialog has expired. Start again from the admin panel.";

impl Dispatcher {
    /// `broadcast_menu`: entry point with the reach counter.
    pub(crate) async fn show_broadcast_menu(&self, cb: &CallbackEvent) {
        let count = match self.store_call(self.store.count_active_users()).await {
            Ok(count) => count,
            Err(e) => return self.reply_store_failure(cb.chat, "count users", &e).await,
        };
        let text = format!(
            "📣 <b>Broadcasts</b>\n\nActive users who will receive a broadcast: {count}"
        );
        let keyboard = Keyboard::new()
            .button("🚀 New broadcast", "broadcast_start")
            .button("⬅️ Back", "back_to_admin");
        let _ = self.channel.edit_html(cb.chat, cb.message, &text, Some(keyboard)).await;
    }

    /// `broadcast_start`: open the dialog at the text stage.
    pub(crate) async fn start_broadcast(&self, cb: &CallbackEvent) {
        self.dialogs
            .set_broadcast_stage(cb.from.id, BroadcastStage::AwaitingText)
            .await;
        let _ = self
            .channel
            .send_html(
                cb.chat,
                "✍️ Send the broadcast text.\n\n\
                 HTML tags b, i, u, s, code, pre, a, strong, em are allowed.\n\
                 /cancel to abort.",
                None,
            )
            .await;
    }

    /// Text stage: validate, sanitize, persist the draft, move to photos.
    pub(crate) async fn handle_broadcast_text_input(&self, msg: &IncomingMessage) {
        let Some(text) = msg.text.as_deref() else {
            let _ = self
                .channel
                .send_text(msg.chat, "❌ Please send the broadcast text first.")
                .await;
            return;
        };
        if let Err(e) = validate_html(text) {
            let _ = self.channel.send_text(msg.chat, &format!("❌ {e}")).await;
            return;
        }
        let text = sanitize_html(text);

        let broadcast = match self
            .store_call(self.store.create_broadcast(msg.from.id, &text))
            .await
        {
            Ok(broadcast) => broadcast,
            Err(e) => return self.abort_dialog(msg.from.id, msg.chat, "create broadcast", &e).await,
        };

        self.dialogs
            .update_broadcast_draft(msg.from.id, |draft| {
                draft.broadcast_id = Some(broadcast.id);
                draft.text = text;
            })
            .await;
        self.dialogs
            .set_broadcast_stage(msg.from.id, BroadcastStage::AwaitingPhoto)
            .await;

        let keyboard = Keyboard::new().button("⏭ No photo", "broadcast_skip_photo");
        let _ = self
            .channel
            .send_html(
                msg.chat,
                "📷 Now send a photo to attach, or continue without one.",
                Some(keyboard),
            )
            .await;
    }

    /// Photo stage: accept one photo or wait for the skip button.
    pub(crate) async fn handle_broadcast_photo_input(
        &self,
        msg: &IncomingMessage,
        draft: BroadcastDraft,
    ) {
        let Some(photo_id) = msg.photo_id.as_deref() else {
            let _ = self
                .channel
                .send_text(msg.chat, "❌ Please send a photo, or press \"No photo\".")
                .await;
            return;
        };
        let Some(broadcast_id) = draft.broadcast_id else {
            debug!(user = msg.from.id.0, "photo stage without a draft broadcast");
            self.dialogs.clear_state(msg.from.id).await;
            let _ = self.channel.send_text(msg.chat, EXPIRED).await;
            return;
        };

        if let Err(e) = self
            .store_call(self.store.add_broadcast_photo(broadcast_id, photo_id, 0))
            .await
        {
            return self.abort_dialog(msg.from.id, msg.chat, "save photo", &e).await;
        }

        let photo_id = photo_id.to_string();
        self.dialogs
            .update_broadcast_draft(msg.from.id, |draft| draft.photo_ids.push(photo_id))
            .await;
        self.show_broadcast_preview(msg.from.id, msg.chat).await;
    }

    /// `broadcast_skip_photo`: continue to the preview without a photo.
    pub(crate) async fn handle_broadcast_skip_photo(&self, cb: &CallbackEvent) {
        let in_photo_stage = matches!(
            self.dialogs.get_state(cb.from.id).await,
            Some(DialogState::Broadcast {
                stage: BroadcastStage::AwaitingPhoto,
                ..
            })
        );
        if !in_photo_stage {
            let _ = self.channel.send_text(cb.chat, EXPIRED).await;
            return;
        }
        self.dialogs
            .update_broadcast_draft(cb.from.id, |draft| draft.skip_photo = true)
            .await;
        self.show_broadcast_preview(cb.from.id, cb.chat).await;
    }

    /// Render the preview exactly as recipients will see it, then ask for
    /// the final confirmation.
    async fn show_broadcast_preview(&self, user: UserId, chat: ChatId) {
        self.dialogs
            .set_broadcast_stage(user, BroadcastStage::Confirming)
            .await;

        let draft = match self.dialogs.get_state(user).await {
            Some(DialogState::Broadcast { draft, .. }) => draft,
            _ => {
                let _ = self.channel.send_text(chat, EXPIRED).await;
                return;
            }
        };

        let count = match self.store_call(self.store.count_active_users()).await {
            Ok(count) => count,
            Err(e) => return self.abort_dialog(user, chat, "count users", &e).await,
        };

        // The message itself, as the recipients will get it.
        let delivery = match draft.photo_ids.first() {
            Some(photo_id) => {
                self.channel
                    .send_photo(chat, photo_id, Some(&draft.text), None)
                    .await
            }
            None => self.channel.send_html(chat, &draft.text, None).await,
        };
        if delivery.is_err() {
            debug!(user = user.0, "could not render broadcast preview");
        }

        let summary = format!(
            "👀 The message above is your broadcast.\n\n\
             📷 Photo: {}\n\
             👥 Recipients: {count}\n\n\
             Send it?",
            if draft.photo_ids.is_empty() { "no" } else { "yes" },
        );
        let keyboard = Keyboard::new().row(vec![
            Button::new("✅ Send", "broadcast_confirm"),
            Button::new("❌ Cancel", "broadcast_cancel"),
        ]);
        let _ = self.channel.send_html(chat, &summary, Some(keyboard)).await;
    }

    /// `broadcast_confirm`: close the dialog and detach the send.
    pub(crate) async fn handle_broadcast_confirm(&self, cb: &CallbackEvent) {
        let draft = match self.dialogs.get_state(cb.from.id).await {
            Some(DialogState::Broadcast {
                stage: BroadcastStage::Confirming,
                draft,
            }) => draft,
            _ => {
                let _ = self.channel.send_text(cb.chat, EXPIRED).await;
                return;
            }
        };
        let Some(broadcast_id) = draft.broadcast_id else {
            self.dialogs.clear_state(cb.from.id).await;
            let _ = self.channel.send_text(cb.chat, EXPIRED).await;
            return;
        };

        self.dialogs.clear_state(cb.from.id).await;
        info!(broadcast_id, admin = cb.from.id.0, "broadcast confirmed");
        let _ = self
            .channel
            .send_text(cb.chat, "🚀 Broadcast started. Progress updates will follow.")
            .await;

        // Fire and forget: the executor owns the broadcast from here.
        let executor = self.executor.clone();
        let admin_chat = cb.chat;
        tokio::spawn(async move {
            executor.execute(broadcast_id, admin_chat).await;
        });
    }

    /// `broadcast_cancel`: delete the draft and close the dialog.
    pub(crate) async fn handle_broadcast_cancel(&self, cb: &CallbackEvent) {
        let draft = match self.dialogs.get_state(cb.from.id).await {
            Some(DialogState::Broadcast { draft, .. }) => draft,
            _ => {
                let _ = self.channel.send_text(cb.chat, EXPIRED).await;
                return;
            }
        };

        if let Some(broadcast_id) = draft.broadcast_id {
            if let Err(e) = self.store_call(self.store.delete_broadcast(broadcast_id)).await {
                // The draft row staying behind is harmless; the dialog still ends.
                debug!(broadcast_id, error = %e, "could not delete draft broadcast");
            }
        }
        self.dialogs.clear_state(cb.from.id).await;
        let _ = self
            .channel
            .send_text(cb.chat, "❌ Broadcast cancelled.")
            .await;
    }
}
