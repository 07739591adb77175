// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Kiosk shop bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide,
//! providing long polling, update mapping, and the outbound [`ChatChannel`]
//! surface with HTML parse mode and inline keyboards.

pub mod keyboards;
pub mod mapping;

use async_trait::async_trait;
use kiosk_config::model::TelegramConfig;
use kiosk_core::error::KioskError;
use kiosk_core::traits::{ChannelAdapter, ChatChannel, PluginAdapter};
use kiosk_core::types::{AdapterType, ChatId, HealthStatus, InboundEvent, Keyboard, MessageRef};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, FileId, InputFile, ParseMode, Recipient};
use teloxide::{ApiError, RequestError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::keyboards::to_inline_markup;

/// Telegram channel adapter implementing [`ChannelAdapter`] and [`ChatChannel`].
///
/// Connects to Telegram via long polling, forwards private-chat messages and
/// callback presses as [`InboundEvent`]s, and delivers replies as HTML.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, KioskError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            KioskError::Config("telegram.bot_token is required for the Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(KioskError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, KioskError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), KioskError> {
        debug!("Telegram channel shutting down");
        // The polling handle will be dropped when TelegramChannel is dropped,
        // which aborts the task. For graceful shutdown, the dispatch loop
        // should stop calling receive() first.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), KioskError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let msg_tx = self.inbound_tx.clone();
        let cb_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = msg_tx.clone();
                    async move {
                        // Group and channel chatter is not for this bot.
                        if !mapping::is_dm(&msg) {
                            debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                            return respond(());
                        }
                        match mapping::map_message(&msg) {
                            Some(mapped) => {
                                if tx.send(InboundEvent::Message(mapped)).await.is_err() {
                                    warn!("inbound channel closed, dropping message");
                                }
                            }
                            None => {
                                debug!(msg_id = msg.id.0, "ignoring message without sender");
                            }
                        }
                        respond(())
                    }
                }))
                .branch(
                    Update::filter_callback_query().endpoint(move |query: CallbackQuery| {
                        let tx = cb_tx.clone();
                        async move {
                            match mapping::map_callback(&query) {
                                Some(event) => {
                                    if tx.send(InboundEvent::Callback(event)).await.is_err() {
                                        warn!("inbound channel closed, dropping callback");
                                    }
                                }
                                None => {
                                    debug!("ignoring callback without message or data");
                                }
                            }
                            respond(())
                        }
                    }),
                );

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore other update kinds
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, KioskError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| KioskError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[async_trait]
impl ChatChannel for TelegramChannel {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageRef, KioskError> {
        let sent = self
            .bot
            .send_message(Recipient::Id(teloxide::types::ChatId(chat.0)), text)
            .await
            .map_err(|e| map_request_err("failed to send message", e))?;
        Ok(MessageRef(sent.id.0))
    }

    async fn send_html(
        &self,
        chat: ChatId,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, KioskError> {
        let mut request = self
            .bot
            .send_message(Recipient::Id(teloxide::types::ChatId(chat.0)), html)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_markup(&keyboard));
        }
        let sent = request
            .await
            .map_err(|e| map_request_err("failed to send message", e))?;
        Ok(MessageRef(sent.id.0))
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        file_id: &str,
        caption_html: Option<&str>,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, KioskError> {
        let mut request = self.bot.send_photo(
            Recipient::Id(teloxide::types::ChatId(chat.0)),
            InputFile::file_id(FileId(file_id.to_string())),
        );
        if let Some(caption) = caption_html {
            request = request.caption(caption).parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_markup(&keyboard));
        }
        let sent = request
            .await
            .map_err(|e| map_request_err("failed to send photo", e))?;
        Ok(MessageRef(sent.id.0))
    }

    async fn edit_html(
        &self,
        chat: ChatId,
        message: MessageRef,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), KioskError> {
        let mut request = self
            .bot
            .edit_message_text(
                teloxide::types::ChatId(chat.0),
                teloxide::types::MessageId(message.0),
                html,
            )
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_markup(&keyboard));
        }
        match request.await {
            Ok(_) => Ok(()),
            // Re-rendering an identical menu is not an error.
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(map_request_err("failed to edit message", e)),
        }
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), KioskError> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if let Some(text) = text {
            request = request.text(text);
        }
        if alert {
            request = request.show_alert(true);
        }
        request
            .await
            .map_err(|e| map_request_err("failed to answer callback", e))?;
        Ok(())
    }
}

/// Classify a teloxide request error.
///
/// A recipient who has blocked the bot gets the dedicated variant so callers
/// can exclude them from future deliveries; everything else is a channel error.
fn map_request_err(context: &str, e: RequestError) -> KioskError {
    if let RequestError::Api(ApiError::BotBlocked) = &e {
        return KioskError::RecipientBlocked;
    }
    KioskError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}
