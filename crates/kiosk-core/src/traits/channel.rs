// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel traits for the chat platform integration.
//!
//! [`ChannelAdapter`] owns the inbound event stream; [`ChatChannel`] is the
//! outbound surface shared by the dispatcher and the broadcast executor.

use async_trait::async_trait;

use crate::error::KioskError;
use crate::types::{ChatId, InboundEvent, Keyboard, MessageRef};

/// Adapter for the inbound side of a messaging platform connection.
#[async_trait]
pub trait ChannelAdapter: super::PluginAdapter {
    /// Establishes a connection to the messaging platform and starts
    /// producing inbound events.
    async fn connect(&mut self) -> Result<(), KioskError>;

    /// Receives the next inbound event from the platform.
    async fn receive(&self) -> Result<InboundEvent, KioskError>;
}

/// Outbound message surface.
///
/// All sends can fail; a send to a recipient who has blocked the bot fails
/// with [`KioskError::RecipientBlocked`] so callers can react (the broadcast
/// executor marks such users permanently excluded).
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageRef, KioskError>;

    /// Send an HTML-formatted message with an optional inline keyboard.
    async fn send_html(
        &self,
        chat: ChatId,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, KioskError>;

    /// Send a photo by platform file id, with an optional HTML caption and keyboard.
    async fn send_photo(
        &self,
        chat: ChatId,
        file_id: &str,
        caption_html: Option<&str>,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, KioskError>;

    /// Edit a previously sent message in place.
    async fn edit_html(
        &self,
        chat: ChatId,
        message: MessageRef,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), KioskError>;

    /// Answer a callback query, optionally with an attention-grabbing alert.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), KioskError>;
}
