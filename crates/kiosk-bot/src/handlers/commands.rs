// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level slash commands.

use kiosk_core::types::{IncomingMessage, Keyboard};
use tracing::warn;

use super::html_escape;
use crate::dispatcher::Dispatcher;

const FALLBACK_WELCOME: &str =
    "👋 Welcome, {name}!\n\nUse the button below to browse the catalog.";

impl Dispatcher {
    /// `/start`: welcome message from settings with `{name}` substituted,
    /// plus the entry button into the catalog.
    pub(crate) async fn handle_start(&self, msg: &IncomingMessage) {
        let template = match self.store_call(self.store.get_settings()).await {
            Ok(settings) => settings.welcome_message,
            Err(e) => {
                // The welcome must go out even when settings cannot load.
                warn!(error = %e, "could not load settings, using fallback welcome");
                FALLBACK_WELCOME.to_string()
            }
        };

        let text = template.replace("{name}", &html_escape(&msg.from.first_name));
        let keyboard = Keyboard::new().button("🛍 Browse products", "show_products");
        if let Err(e) = self.channel.send_html(msg.chat, &text, Some(keyboard)).await {
            warn!(chat = msg.chat.0, error = %e, "could not send welcome");
        }
    }

    /// `/products`: the region menu as a fresh message.
    pub(crate) async fn handle_products(&self, msg: &IncomingMessage) {
        match self.regions_view().await {
            Ok((text, keyboard)) => {
                let _ = self.channel.send_html(msg.chat, &text, keyboard).await;
            }
            Err(e) => self.reply_store_failure(msg.chat, "list regions", &e).await,
        }
    }

    /// `/cancel`: abort any active dialog.
    pub(crate) async fn handle_cancel(&self, msg: &IncomingMessage) {
        let user = msg.from.id;
        if self.dialogs.is_active(user).await {
            self.dialogs.clear_state(user).await;
            let _ = self
                .channel
                .send_text(msg.chat, "✅ Cancelled. You can start over any time.")
                .await;
        } else {
            let _ = self
                .channel
                .send_text(msg.chat, "Nothing to cancel.")
                .await;
        }
    }

    pub(crate) async fn handle_unknown_command(&self, msg: &IncomingMessage, command: &str) {
        let _ = self
            .channel
            .send_text(
                msg.chat,
                &format!(
                    "Unknown command /{command}.\n\n\
                     Available commands:\n\
                     /start — welcome and catalog\n\
                     /products — browse products\n\
                     /my_orders — your orders\n\
                     /cancel — abort the current dialog"
                ),
            )
            .await;
    }
}
