// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-text input routed through an active dialog state.
//!
//! Recoverable input problems (bad number, bad HTML) keep the dialog alive
//! so the user can just try again; storage failures abort the dialog so a
//! broken backend cannot trap anyone in a loop.

use kiosk_core::error::KioskError;
use kiosk_core::types::{ChatId, IncomingMessage, UserId};

use super::format_price;
use crate::dispatcher::Dispatcher;
use crate::fsm::{BroadcastStage, DialogState};
use crate::validation::{sanitize_html, validate_html, validate_price};

impl Dispatcher {
    pub(crate) async fn handle_dialog_input(&self, msg: &IncomingMessage, state: DialogState) {
        match state {
            DialogState::AwaitingPrice { product_id } => {
                self.handle_price_input(msg, product_id).await
            }
            DialogState::AwaitingName { product_id } => {
                self.handle_name_input(msg, product_id).await
            }
            DialogState::AwaitingDescription { product_id } => {
                self.handle_description_input(msg, product_id).await
            }
            DialogState::AwaitingCategoryDescription { category_id } => {
                self.handle_category_description_input(msg, category_id).await
            }
            DialogState::AwaitingWelcomeMessage => self.handle_welcome_input(msg).await,
            DialogState::Broadcast { stage, draft } => match stage {
                BroadcastStage::AwaitingText => self.handle_broadcast_text_input(msg).await,
                BroadcastStage::AwaitingPhoto => {
                    self.handle_broadcast_photo_input(msg, draft).await
                }
                BroadcastStage::Confirming => {
                    let _ = self
                        .channel
                        .send_text(
                            msg.chat,
                            "Use the buttons above to send or cancel the broadcast.",
                        )
                        .await;
                }
            },
        }
    }

    /// Storage broke mid-dialog: abort the dialog and apologize.
    pub(crate) async fn abort_dialog(
        &self,
        user: UserId,
        chat: ChatId,
        context: &str,
        e: &KioskError,
    ) {
        self.dialogs.clear_state(user).await;
        self.reply_store_failure(chat, context, e).await;
    }

    async fn handle_price_input(&self, msg: &IncomingMessage, product_id: i64) {
        let price: f64 = match msg.text.as_deref().and_then(|t| t.trim().parse().ok()) {
            Some(price) => price,
            None => {
                let _ = self
                    .channel
                    .send_text(
                        msg.chat,
                        "❌ Please send the price as a number, e.g. 199.99.",
                    )
                    .await;
                return;
            }
        };
        if let Err(e) = validate_price(price) {
            let _ = self.channel.send_text(msg.chat, &format!("❌ {e}")).await;
            return;
        }

        if let Err(e) = self
            .store_call(self.store.update_product_price(product_id, price))
            .await
        {
            return self.abort_dialog(msg.from.id, msg.chat, "update price", &e).await;
        }

        self.dialogs.clear_state(msg.from.id).await;
        let _ = self
            .channel
            .send_text(
                msg.chat,
                &format!("✅ Price updated to {}.", format_price(price)),
            )
            .await;
    }

    async fn handle_name_input(&self, msg: &IncomingMessage, product_id: i64) {
        let name = match msg.text.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let _ = self
                    .channel
                    .send_text(msg.chat, "❌ Please send the new name as text.")
                    .await;
                return;
            }
        };

        let product = match self.store_call(self.store.get_product(product_id)).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                self.dialogs.clear_state(msg.from.id).await;
                let _ = self.channel.send_text(msg.chat, "⚠️ Product not found.").await;
                return;
            }
            Err(e) => return self.abort_dialog(msg.from.id, msg.chat, "load product", &e).await,
        };

        if let Err(e) = self
            .store_call(self.store.update_product(product_id, &name, product.price, &product.description))
            .await
        {
            return self.abort_dialog(msg.from.id, msg.chat, "update product", &e).await;
        }

        self.dialogs.clear_state(msg.from.id).await;
        let _ = self
            .channel
            .send_text(msg.chat, &format!("✅ Name updated to \"{name}\"."))
            .await;
    }

    async fn handle_description_input(&self, msg: &IncomingMessage, product_id: i64) {
        let Some(text) = msg.text.as_deref() else {
            let _ = self
                .channel
                .send_text(msg.chat, "❌ Please send the description as text.")
                .await;
            return;
        };
        if let Err(e) = validate_html(text) {
            let _ = self.channel.send_text(msg.chat, &format!("❌ {e}")).await;
            return;
        }
        let description = sanitize_html(text);

        let product = match self.store_call(self.store.get_product(product_id)).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                self.dialogs.clear_state(msg.from.id).await;
                let _ = self.channel.send_text(msg.chat, "⚠️ Product not found.").await;
                return;
            }
            Err(e) => return self.abort_dialog(msg.from.id, msg.chat, "load product", &e).await,
        };

        if let Err(e) = self
            .store_call(self.store.update_product(product_id, &product.name, product.price, &description))
            .await
        {
            return self.abort_dialog(msg.from.id, msg.chat, "update product", &e).await;
        }

        self.dialogs.clear_state(msg.from.id).await;
        let _ = self
            .channel
            .send_text(msg.chat, "✅ Description updated.")
            .await;
    }

    async fn handle_category_description_input(&self, msg: &IncomingMessage, category_id: i64) {
        let Some(text) = msg.text.as_deref() else {
            let _ = self
                .channel
                .send_text(msg.chat, "❌ Please send the description as text.")
                .await;
            return;
        };
        if let Err(e) = validate_html(text) {
            let _ = self.channel.send_text(msg.chat, &format!("❌ {e}")).await;
            return;
        }
        let description = sanitize_html(text);

        if let Err(e) = self
            .store_call(self.store.update_category_description(category_id, &description))
            .await
        {
            return self.abort_dialog(msg.from.id, msg.chat, "update category", &e).await;
        }

        self.dialogs.clear_state(msg.from.id).await;
        let _ = self
            .channel
            .send_text(msg.chat, "✅ Category description updated.")
            .await;
    }

    async fn handle_welcome_input(&self, msg: &IncomingMessage) {
        let Some(text) = msg.text.as_deref() else {
            let _ = self
                .channel
                .send_text(msg.chat, "❌ Please send the welcome message as text.")
                .await;
            return;
        };
        if let Err(e) = validate_html(text) {
            let _ = self.channel.send_text(msg.chat, &format!("❌ {e}")).await;
            return;
        }
        let welcome = sanitize_html(text);

        if let Err(e) = self.store_call(self.store.update_welcome_message(&welcome)).await {
            return self.abort_dialog(msg.from.id, msg.chat, "update welcome", &e).await;
        }

        self.dialogs.clear_state(msg.from.id).await;
        let _ = self
            .channel
            .send_text(msg.chat, "✅ Welcome message updated.")
            .await;
    }
}
